//! Display formatting for token amounts and addresses.

use alloy_primitives::{Address, U256};

/// Formats a raw token amount using the token's decimal precision.
///
/// Trailing zeros in the fractional part are trimmed, but at least one
/// digit is kept: 1_000_000 at 6 decimals formats as `"1.0"`, not `"1"`.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return format!("{value}.0");
    }

    let base = U256::from(10u64).pow(U256::from(decimals as u64));
    let integer = value / base;
    let fraction = value % base;

    let mut frac = fraction.to_string();
    while frac.len() < decimals as usize {
        frac.insert(0, '0');
    }
    while frac.len() > 1 && frac.ends_with('0') {
        frac.pop();
    }

    format!("{integer}.{frac}")
}

/// Formats a wei amount as the native currency (18 decimals).
pub fn format_ether(value: U256) -> String {
    format_units(value, 18)
}

/// Truncates an address for display: `0xd057...2a08`.
pub fn truncate_address(address: &Address) -> String {
    truncate_hex(&address.to_string())
}

/// Truncates a hex string the same way. Strings at or below the
/// truncated length pass through unchanged, so applying this twice is a
/// no-op.
pub fn truncate_hex(value: &str) -> String {
    if value.len() <= 13 {
        return value.to_string();
    }
    format!("{}...{}", &value[..6], &value[value.len() - 4..])
}

/// Parses a decimal amount string as served by the relay.
///
/// Malformed values degrade to zero; an undecodable amount must still
/// render a row rather than break the list.
pub fn parse_amount(value: &str) -> U256 {
    match U256::from_str_radix(value, 10) {
        Ok(v) => v,
        Err(_) => {
            log::warn!("unparseable amount in relay feed: {value:?}");
            U256::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_six_decimal_token() {
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1.0");
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(12_345_678u64), 6), "12.345678");
    }

    #[test]
    fn formats_ether() {
        assert_eq!(format_ether(U256::from(1_000_000_000_000_000_000u64)), "1.0");
        assert_eq!(format_ether(U256::from(1_500_000_000_000_000_000u64)), "1.5");
        assert_eq!(format_ether(U256::ZERO), "0.0");
    }

    #[test]
    fn keeps_leading_fraction_zeros() {
        assert_eq!(format_units(U256::from(1_050_000u64), 6), "1.05");
        assert_eq!(format_units(U256::from(50_000u64), 6), "0.05");
    }

    #[test]
    fn zero_decimals_formats_as_whole() {
        assert_eq!(format_units(U256::from(42u64), 0), "42.0");
    }

    #[test]
    fn truncates_address() {
        let addr: Address = "0xd057604a14982fe8d88c5fc25aac3267ea142a08"
            .parse()
            .unwrap();
        let short = truncate_address(&addr);
        assert!(short.starts_with("0x"));
        assert_eq!(short.len(), 13);
        assert!(short.contains("..."));
    }

    #[test]
    fn hex_truncation_is_idempotent() {
        let full = "0xd057604a14982fe8d88c5fc25aac3267ea142a08";
        let short = truncate_hex(full);
        assert_eq!(short, "0xd057...2a08");
        assert_eq!(truncate_hex(&short), short);
        assert_eq!(truncate_hex("-"), "-");
    }

    #[test]
    fn parses_relay_amounts() {
        assert_eq!(parse_amount("1000000"), U256::from(1_000_000u64));
        assert_eq!(parse_amount("0"), U256::ZERO);
        assert_eq!(parse_amount("not-a-number"), U256::ZERO);
    }
}
