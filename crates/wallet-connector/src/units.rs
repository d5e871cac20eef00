//! Address checks and ether amount formatting.

use crate::error::{ConnectorError, Result};

/// Wei per ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Whether `address` is `0x` followed by 40 hex digits. Checksums are not verified.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parse a JSON-RPC hex quantity such as `0x1bc16d674ec80000`.
pub fn parse_quantity(value: &str) -> Result<u128> {
    let hex = value
        .trim()
        .strip_prefix("0x")
        .ok_or_else(|| ConnectorError::InvalidResponse(format!("bad quantity {:?}", value)))?;
    if hex.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(hex, 16)
        .map_err(|_| ConnectorError::InvalidResponse(format!("bad quantity {:?}", value)))
}

/// Format a wei amount as decimal ether, always with at least one fractional digit.
///
/// `1_500_000_000_000_000_000` becomes `"1.5"`, one ether becomes `"1.0"`.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;

    let digits = format!("{:018}", fraction);
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    format!("{}.{}", whole, digits)
}
