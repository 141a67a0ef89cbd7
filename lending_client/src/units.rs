use alloy::primitives::U256;
use anyhow::{bail, Context, Result};

/// On-chain amounts are fixed-point integers scaled by 10^18.
pub const SCALE_DECIMALS: u32 = 18;

fn scale_factor() -> U256 {
    U256::from(10).pow(U256::from(SCALE_DECIMALS))
}

/// Parses a human decimal string into its 10^18 fixed-point representation.
///
/// Fractional digits beyond the 18th are truncated, matching the on-chain
/// scale. Rejects empty, signed, and non-decimal input.
pub fn to_fixed_point(decimal: &str) -> Result<U256> {
    let decimal = decimal.trim();

    let (int_part, frac_part) = match decimal.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (decimal, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        bail!("empty amount");
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        bail!("invalid decimal amount: {}", decimal);
    }

    let int_value = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10)
            .with_context(|| format!("invalid decimal amount: {}", decimal))?
    };

    let frac_digits: String = frac_part.chars().take(SCALE_DECIMALS as usize).collect();
    let frac_value = if frac_digits.is_empty() {
        U256::ZERO
    } else {
        // Right-pad to the full scale so "5" after "1." means 0.5, not 5 wei
        let padded = format!("{:0<width$}", frac_digits, width = SCALE_DECIMALS as usize);
        U256::from_str_radix(&padded, 10)
            .with_context(|| format!("invalid decimal amount: {}", decimal))?
    };

    int_value
        .checked_mul(scale_factor())
        .and_then(|scaled| scaled.checked_add(frac_value))
        .with_context(|| format!("amount out of range: {}", decimal))
}

/// Renders a 10^18 fixed-point integer as a decimal string.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit
/// is always kept, so `5 * 10^18` renders as "5.0".
pub fn to_decimal(value: U256) -> String {
    let scale = scale_factor();
    let whole = value / scale;
    let frac = value % scale;

    let padded = format!("{:0>width$}", frac.to_string(), width = SCALE_DECIMALS as usize);
    let trimmed = padded.trim_end_matches('0');
    let frac_str = if trimmed.is_empty() { "0" } else { trimmed };

    format!("{}.{}", whole, frac_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_canonical_decimals() {
        for decimal in [
            "0.0",
            "5.0",
            "0.5",
            "123.456",
            "0.000000000000000001",
            "1000000.000000000000000001",
        ] {
            let fixed = to_fixed_point(decimal).unwrap();
            assert_eq!(to_decimal(fixed), decimal, "round trip failed for {}", decimal);
        }
    }

    #[test]
    fn scales_whole_amounts() {
        let five = to_fixed_point("5.0").unwrap();
        assert_eq!(five, U256::from(5) * U256::from(10).pow(U256::from(18)));
        assert_eq!(to_fixed_point("5").unwrap(), five);
    }

    #[test]
    fn truncates_beyond_eighteen_fractional_digits() {
        let truncated = to_fixed_point("1.1234567890123456789").unwrap();
        let exact = to_fixed_point("1.123456789012345678").unwrap();
        assert_eq!(truncated, exact);
    }

    #[test]
    fn renders_zero_with_one_fractional_digit() {
        assert_eq!(to_decimal(U256::ZERO), "0.0");
        assert_eq!(
            to_decimal(U256::from(5) * U256::from(10).pow(U256::from(18))),
            "5.0"
        );
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", ".", "abc", "1.2.3", "-1", "1,5", "0x10"] {
            assert!(to_fixed_point(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn accepts_bare_fractional_part() {
        assert_eq!(to_decimal(to_fixed_point(".5").unwrap()), "0.5");
    }
}
