//! Exact price values.
//!
//! Prices are arbitrary-precision rationals: decimal text such as `12.34`,
//! `-3` or `1.5e2` is read without rounding, fractions such as `1/3` stay
//! fractions, and inverting a price gives its exact reciprocal.
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

/// Exact price value.
pub type Price = BigRational;

/// Largest decimal exponent accepted when reading a price.
const MAX_EXPONENT: i64 = 4096;

/// Parses `12.34`, `-3`, `1.5e2` or a fraction of two such numbers.
pub fn parse_exact(text: &str) -> Option<Price> {
    let text = text.trim();
    match text.split_once('/') {
        Some((numer, denom)) => {
            let denom = parse_decimal(denom)?;
            if denom.is_zero() {
                return None;
            }
            Some(parse_decimal(numer)? / denom)
        }
        None => parse_decimal(text),
    }
}

/// Exact reciprocal; `None` for zero.
pub fn invert(value: &Price) -> Option<Price> {
    (!value.is_zero()).then(|| value.recip())
}

fn parse_decimal(text: &str) -> Option<Price> {
    let text = text.trim();
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], text[at + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let numer: BigInt = format!("{whole}{fraction}").parse().ok()?;
    let scale = exponent.checked_sub(i64::try_from(fraction.len()).ok()?)?;
    if scale.abs() > MAX_EXPONENT {
        return None;
    }
    let power = num_traits::pow(BigInt::from(10u32), usize::try_from(scale.abs()).ok()?);
    let value = if scale.is_negative() {
        BigRational::new(numer, power)
    } else {
        BigRational::from_integer(numer * power)
    };
    Some(if negative { -value } else { value })
}

/// Serde adapter storing a [`Price`] as text, `617/50` or `12`.
pub mod as_text {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{Price, parse_exact};

    /// Writes the reduced fraction.
    pub fn serialize<S: Serializer>(value: &Price, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// Reads a fraction or a decimal.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Price, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_exact(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid price value '{}'", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    fn frac(numer: i64, denom: i64) -> Price {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!(parse_exact("12.34"), Some(frac(1234, 100)));
        assert_eq!(parse_exact(" -3 "), Some(frac(-3, 1)));
        assert_eq!(parse_exact("+.5"), Some(frac(1, 2)));
        assert_eq!(parse_exact("1.5e2"), Some(frac(150, 1)));
        assert_eq!(parse_exact("25E-3"), Some(frac(1, 40)));
        assert_eq!(parse_exact("3/4"), Some(frac(3, 4)));
        assert_eq!(parse_exact("1.5/0.5"), Some(frac(3, 1)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", ".", "abc", "1.2.3", "1/0", "1e", "12,5", "1e99999"] {
            assert_eq!(parse_exact(text), None, "{text}");
        }
    }

    #[test]
    fn test_long_prices_are_not_rounded() {
        let text = "1234567890.12345678901234567890123456789";
        let value = parse_exact(text).unwrap();
        let scaled = value * BigRational::from_integer(BigInt::from(10).pow(29));
        let digits: BigInt = text.replace('.', "").parse().unwrap();
        assert_eq!(scaled, BigRational::from_integer(digits));
    }

    #[test]
    fn test_invert_is_exact() {
        for text in ["3", "7", "0.9", "1/3"] {
            let price = parse_exact(text).unwrap();
            let inverse = invert(&price).unwrap();
            assert!((inverse * price).is_one(), "{text}");
        }
        assert_eq!(invert(&Price::zero()), None);
    }

    #[test]
    fn test_text_form() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Wrapped(#[serde(with = "as_text")] Price);

        assert_eq!(serde_json::to_string(&Wrapped(frac(1234, 100))).unwrap(), "\"617/50\"");
        assert_eq!(serde_json::to_string(&Wrapped(frac(12, 1))).unwrap(), "\"12\"");
        let read: Wrapped = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(read, Wrapped(frac(25, 2)));
        assert!(serde_json::from_str::<Wrapped>("\"twelve\"").is_err());
    }
}
