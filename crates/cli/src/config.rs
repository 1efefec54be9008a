//! Operator configuration
//!
//! Sources, lowest to highest precedence: built-in defaults, a TOML file
//! (`--config`, or `scalar.toml` in the working directory when present),
//! `SCALAR_*` environment variables, then command line flags.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile};
use scalar_tariff::{
    TariffParams, DEFAULT_EXCHANGES, DEFAULT_PUBLIC_CAP, DEFAULT_TARIFF_RATE, DEFAULT_UNIT_PRICE,
};
use scalar_types::{AccountId, Wei};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "scalar.toml";
pub const DEFAULT_STATE_FILE: &str = "scalar-state.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarConfig {
    pub name: String,
    pub symbol: String,
    /// Public mint price in wei. Accepts an integer or a decimal string,
    /// so amounts beyond the TOML integer range can be quoted.
    #[serde(with = "wei_amount")]
    pub price_wei: Wei,
    /// Credits per trade scaled by 10^18 (10^15 = 1 per 1000 trades)
    pub tariff_rate: u64,
    /// Public cap, excluding tariff issuance
    pub max_supply: u64,
    pub exchanges: Vec<AccountId>,
    pub owner: Option<AccountId>,
    pub log_level: String,
    /// `pretty`, `compact` or `json`
    pub log_format: String,
    pub state_path: PathBuf,
}

impl Default for ScalarConfig {
    fn default() -> Self {
        Self {
            name: "Scalar".to_string(),
            symbol: "SCL".to_string(),
            price_wei: DEFAULT_UNIT_PRICE,
            tariff_rate: DEFAULT_TARIFF_RATE as u64,
            max_supply: DEFAULT_PUBLIC_CAP,
            exchanges: DEFAULT_EXCHANGES
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            owner: None,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            state_path: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl ScalarConfig {
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        let resolved_path = match config_path_override {
            Some(path) => {
                if !path.exists() {
                    bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path.to_path_buf())
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(
            Environment::with_prefix("SCALAR")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("exchanges"),
        );
        // Numeric env parsing stops at i64, so the price is taken verbatim.
        if let Ok(raw) = std::env::var("SCALAR_PRICE_WEI") {
            builder = builder
                .set_override("price_wei", raw)
                .context("invalid SCALAR_PRICE_WEI")?;
        }

        let config = builder.build().context("failed to read configuration")?;
        config
            .try_deserialize()
            .context("failed to parse configuration")
    }

    /// The owner identity, falling back to a well-known deployer label.
    pub fn owner_or_deployer(&self) -> AccountId {
        self.owner
            .unwrap_or_else(|| AccountId::from_label("deployer"))
    }

    pub fn tariff_params(&self) -> TariffParams {
        TariffParams {
            unit_price: self.price_wei,
            tariff_rate: self.tariff_rate as u128,
            public_cap: self.max_supply,
            venues: self.exchanges.iter().copied().collect(),
            owner: self.owner_or_deployer(),
        }
    }
}

mod wei_amount {
    use scalar_types::Wei;
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &Wei, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Wei, D::Error> {
        deserializer.deserialize_any(WeiVisitor)
    }

    struct WeiVisitor;

    impl<'de> Visitor<'de> for WeiVisitor {
        type Value = Wei;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative wei amount as an integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Wei, E> {
            Ok(v.into())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Wei, E> {
            Wei::try_from(v).map_err(|_| E::custom(format!("negative wei amount {v}")))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Wei, E> {
            Ok(v)
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<Wei, E> {
            Wei::try_from(v).map_err(|_| E::custom(format!("negative wei amount {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Wei, E> {
            v.trim()
                .replace('_', "")
                .parse()
                .map_err(|_| E::custom(format!("invalid wei amount {v:?}")))
        }
    }
}
