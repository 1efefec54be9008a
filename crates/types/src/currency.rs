//! Payment amounts and fixed-point rate scale
//!
//! Payments are denominated in wei (1 ETH = 10^18 wei) and held as `u128`,
//! which covers any realistic `price × supply` product without overflow.

use rust_decimal::Decimal;

/// Payment amount in wei.
pub type Wei = u128;

/// Number of decimal places in one ETH.
pub const ETH_DECIMALS: u32 = 18;

/// 1 ETH expressed in wei.
pub const WEI_PER_ETH: Wei = 10u128.pow(ETH_DECIMALS);

/// Fixed-point scale for tariff rates. A rate equal to `RATE_SCALE` earns one
/// credit per trade; `RATE_SCALE / 1000` earns one credit per thousand trades.
pub const RATE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Render a wei amount as an exact ETH decimal string (`10^16` → `"0.01"`).
pub fn format_eth(amount: Wei) -> String {
    match i128::try_from(amount)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, ETH_DECIMALS).ok())
    {
        Some(value) => value.normalize().to_string(),
        None => {
            // Beyond the 96-bit decimal mantissa; fall back to integer math.
            let whole = amount / WEI_PER_ETH;
            let frac = amount % WEI_PER_ETH;
            if frac == 0 {
                whole.to_string()
            } else {
                let digits = format!("{:018}", frac);
                format!("{}.{}", whole, digits.trim_end_matches('0'))
            }
        }
    }
}

/// Render a tariff rate as its trade-to-credit ratio (`10^15` → `"1:1000"`).
pub fn format_rate(rate: u128) -> String {
    if rate == 0 {
        return "1:∞".to_string();
    }
    format!("1:{}", RATE_SCALE / rate)
}
