//! Scalar operator command line
//!
//! Deploys a collection configuration, inspects persisted engine state and
//! runs in-memory trading simulations.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use scalar_cli::config::ScalarConfig;
use scalar_cli::logging::init_logging;
use scalar_cli::state::StateFile;
use scalar_tariff::{EngineSnapshot, RateCalculator, TariffEngine};
use scalar_token::ScalarToken;
use scalar_treasury::InMemoryPayout;
use scalar_types::{format_eth, format_rate, AccountId};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "scalar")]
#[command(about = "Scalar tariff collection operator tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration and write the initial engine state
    Deploy(DeployCommand),
    /// Show counters and audit results for a persisted state file
    Status {
        /// State file (defaults to the configured state path)
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Run public mints and venue trades against a fresh in-memory collection
    Simulate(SimulateCommand),
}

#[derive(Args)]
struct DeployCommand {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    symbol: Option<String>,
    /// The price (in wei) to mint a single item
    #[arg(long, short = 'p')]
    price_wei: Option<u128>,
    /// The tariff rate (1e15 == 1:1000, 1e18 == 1:1)
    #[arg(long, short = 't')]
    tariff_rate: Option<u64>,
    /// The public max supply (excluding tariff)
    #[arg(long, short = 'm')]
    max_supply: Option<u64>,
    /// Exchanges that accrue tariff on transfer (repeatable)
    #[arg(long = "exchange", short = 'e')]
    exchanges: Vec<AccountId>,
    /// Owner identity
    #[arg(long, short = 'a')]
    owner: Option<AccountId>,
    /// Where to write the state file
    #[arg(long)]
    state: Option<PathBuf>,
    /// Replace an existing state file
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct SimulateCommand {
    /// Items bought through the public pool before trading starts
    #[arg(long, default_value_t = 1)]
    mints: u64,
    /// Venue-initiated transfers to perform
    #[arg(long, default_value_t = 0)]
    trades: u64,
    /// Redeem every earned credit for the owner at the end
    #[arg(long)]
    redeem: bool,
    /// Persist the resulting engine state to this path
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ScalarConfig::load(cli.config.as_deref())?;
    init_logging(&config)?;

    match cli.command {
        Commands::Deploy(cmd) => {
            let force = cmd.force;
            apply_deploy_overrides(&mut config, cmd);
            deploy(&config, force)
        }
        Commands::Status { state } => {
            let path = state.unwrap_or_else(|| config.state_path.clone());
            status(&path)
        }
        Commands::Simulate(cmd) => simulate(&config, cmd),
    }
}

fn apply_deploy_overrides(config: &mut ScalarConfig, cmd: DeployCommand) {
    if let Some(name) = cmd.name {
        config.name = name;
    }
    if let Some(symbol) = cmd.symbol {
        config.symbol = symbol;
    }
    if let Some(price) = cmd.price_wei {
        config.price_wei = price;
    }
    if let Some(rate) = cmd.tariff_rate {
        config.tariff_rate = rate;
    }
    if let Some(max_supply) = cmd.max_supply {
        config.max_supply = max_supply;
    }
    if !cmd.exchanges.is_empty() {
        config.exchanges = cmd.exchanges;
    }
    if cmd.owner.is_some() {
        config.owner = cmd.owner;
    }
    if let Some(state) = cmd.state {
        config.state_path = state;
    }
}

fn deploy(config: &ScalarConfig, force: bool) -> Result<()> {
    let params = config.tariff_params();
    let engine = TariffEngine::new(params).context("invalid collection parameters")?;

    println!("Minting {} ({})", config.name, config.symbol);
    println!("=====================================");
    print_engine_config(&engine);

    let state = StateFile {
        name: config.name.clone(),
        symbol: config.symbol.clone(),
        engine: engine.snapshot(),
    };
    state.create(&config.state_path, force)?;
    info!(path = %config.state_path.display(), "initial state written");
    println!("State: {}", config.state_path.display());
    Ok(())
}

fn status(path: &std::path::Path) -> Result<()> {
    let state = StateFile::load(path)?;
    let engine = TariffEngine::restore(state.engine)
        .with_context(|| format!("state file {} is inconsistent", path.display()))?;

    println!("{} ({})", state.name, state.symbol);
    println!("=====================================");
    print_engine_config(&engine);
    print_counters(&engine.snapshot(), engine.remaining_credits(), engine.total_issued());

    let audit = engine.audit();
    if audit.is_healthy {
        println!("Audit: healthy");
    } else {
        println!("Audit: {} issue(s)", audit.issues.len());
        for issue in &audit.issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}

fn simulate(config: &ScalarConfig, cmd: SimulateCommand) -> Result<()> {
    let params = config.tariff_params();
    let owner = params.owner;
    let Some(venue) = params.venues.iter().next().copied() else {
        bail!("simulation needs at least one configured exchange");
    };
    if cmd.trades > 0 && cmd.mints == 0 {
        bail!("trades need at least one minted item (use --mints)");
    }

    let token = ScalarToken::new(config.name.clone(), config.symbol.clone(), params)?;
    let alice = AccountId::from_label("alice");
    let bob = AccountId::from_label("bob");

    if cmd.mints > 0 {
        let payment = token
            .price()
            .checked_mul(cmd.mints as u128)
            .context("payment overflow")?;
        token.mint(&alice, &alice, cmd.mints, payment)?;
    }

    token.set_approval_for_all(&alice, &venue, true)?;
    token.set_approval_for_all(&bob, &venue, true)?;
    for i in 0..cmd.trades {
        let (from, to) = if i % 2 == 0 { (alice, bob) } else { (bob, alice) };
        token.safe_transfer_from(&venue, &from, &to, 0)?;
    }

    if cmd.redeem && token.tariff_remaining() > 0 {
        let receipt = token.mint_tariff(&owner, &owner, token.tariff_remaining())?;
        println!("Redeemed {} tariff item(s) for the owner", receipt.count());
    }

    let mut payout = InMemoryPayout::new();
    let withdrawn = token.withdraw(&owner, &mut payout)?;

    println!("Simulation of {} ({})", token.name(), token.symbol());
    println!("=====================================");
    let snapshot = token.snapshot();
    print_counters(&snapshot, token.tariff_remaining(), token.total_supply());
    println!("Withdrawn: {} ETH", format_eth(withdrawn));

    if let Some(path) = cmd.save {
        let state = StateFile {
            name: token.name().to_string(),
            symbol: token.symbol().to_string(),
            engine: snapshot,
        };
        state.save(&path)?;
        println!("State: {}", path.display());
    }
    Ok(())
}

fn print_engine_config(engine: &TariffEngine) {
    let venues: Vec<String> = engine.venues().iter().map(ToString::to_string).collect();
    println!("Price: {} ETH", format_eth(engine.unit_price()));
    println!(
        "Tariff Rate: {} (1 mint per {} trades)",
        format_rate(engine.rate().tariff_rate()),
        engine.rate().trades_per_credit()
    );
    println!("Max Supply: {} (excluding tariff)", engine.public_cap());
    println!("Exchanges: {}", venues.join(", "));
    println!("Owner: {}", engine.owner());
}

fn print_counters(snapshot: &EngineSnapshot, remaining_credits: u64, total_issued: u128) {
    println!("Trades: {}", snapshot.trade_count);
    if let Ok(rate) = RateCalculator::new(snapshot.tariff_rate) {
        println!(
            "Next credit in: {} trade(s)",
            rate.trades_until_next_credit(snapshot.trade_count)
        );
    }
    println!(
        "Tariff: {} earned, {} redeemed, {} remaining",
        snapshot.credits_earned, snapshot.credits_redeemed, remaining_credits
    );
    println!(
        "Public: {} / {}",
        snapshot.public_issued, snapshot.public_cap
    );
    println!("Total issued: {}", total_issued);
}
