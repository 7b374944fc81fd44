use crate::error::{Error, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

/// Parses a manually entered amount such as `"12.50"`, `"$1,234.50"`,
/// `"1.234,50 zł"`, `"12,5"` or `"(3.00)"`.
///
/// Currency symbols, letters and whitespace are dropped. When both `.` and `,`
/// are present the right-most one is the decimal separator. A lone `,`
/// followed by one or two digits is a decimal comma, otherwise a thousands
/// separator.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();

    let (is_negative, inner) = if trimmed.starts_with('(') && trimmed.ends_with(')') {
        (true, &trimmed[1..trimmed.len() - 1])
    } else {
        (false, trimmed)
    };

    let kept: String = inner
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect();

    let cleaned = normalize_separators(&kept);
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidAmount(text.to_string()));
    }

    let mut amount =
        Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount(text.to_string()))?;

    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }

    Ok(amount)
}

/// Like [`parse_amount`] but never fails: anything unparseable counts as zero.
pub fn coerce_amount(text: &str) -> Decimal {
    match parse_amount(text) {
        Ok(amount) => amount,
        Err(_) => {
            if !text.trim().is_empty() {
                debug!("Treating unparseable amount {:?} as 0", text);
            }
            Decimal::ZERO
        }
    }
}

/// `price * quantity`, or zero when the product does not fit in a `Decimal`.
pub fn multiply_or_zero(price: Decimal, quantity: Decimal) -> Decimal {
    price.checked_mul(quantity).unwrap_or_else(|| {
        warn!("Line total {} x {} overflows, counting it as 0", price, quantity);
        Decimal::ZERO
    })
}

/// Adds `amount` to `total` unless the sum overflows; then the amount counts
/// as zero and `total` is left as it was.
pub fn accumulate(total: &mut Decimal, amount: Decimal) -> bool {
    match total.checked_add(amount) {
        Some(sum) => {
            *total = sum;
            true
        }
        None => {
            warn!("Adding {} to {} overflows, counting it as 0", amount, total);
            false
        }
    }
}

fn normalize_separators(kept: &str) -> String {
    let last_dot = kept.rfind('.');
    let last_comma = kept.rfind(',');

    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            // the right-most separator is the decimal one
            let (decimal, thousands) = if dot > comma { ('.', ',') } else { (',', '.') };
            kept.chars()
                .filter(|c| *c != thousands)
                .map(|c| if c == decimal { '.' } else { c })
                .collect()
        }
        (None, Some(comma)) => {
            let digits_after = kept.len() - comma - 1;
            if kept.matches(',').count() == 1 && (1..=2).contains(&digits_after) {
                kept.replace(',', ".")
            } else {
                kept.replace(',', "")
            }
        }
        _ => kept.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_amounts() {
        assert_eq!(parse_amount("100").unwrap(), Decimal::new(100, 0));
        assert_eq!(parse_amount(" 12.50 ").unwrap(), Decimal::new(1250, 2));
        assert_eq!(parse_amount("-4").unwrap(), Decimal::new(-4, 0));
    }

    #[test]
    fn test_currency_symbols_and_separators() {
        assert_eq!(parse_amount("$1,234.50").unwrap(), Decimal::new(123450, 2));
        assert_eq!(parse_amount("1.234,50 zł").unwrap(), Decimal::new(123450, 2));
        assert_eq!(parse_amount("12,5").unwrap(), Decimal::new(125, 1));
        assert_eq!(parse_amount("1,234").unwrap(), Decimal::new(1234, 0));
        assert_eq!(parse_amount("€ 3.99").unwrap(), Decimal::new(399, 2));
    }

    #[test]
    fn test_parentheses_are_negative() {
        assert_eq!(parse_amount("(3.00)").unwrap(), Decimal::new(-300, 2));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(parse_amount("abc"), Err(Error::InvalidAmount(_))));
        assert!(matches!(parse_amount(""), Err(Error::InvalidAmount(_))));
        assert!(matches!(parse_amount("1-2"), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn test_multiply_overflow_is_zero() {
        assert_eq!(multiply_or_zero(Decimal::MAX, Decimal::new(2, 0)), Decimal::ZERO);
        assert_eq!(
            multiply_or_zero(Decimal::new(250, 2), Decimal::new(3, 0)),
            Decimal::new(750, 2)
        );
    }

    #[test]
    fn test_accumulate_skips_overflowing_amount() {
        let mut total = Decimal::MAX;
        assert!(!accumulate(&mut total, Decimal::ONE));
        assert_eq!(total, Decimal::MAX);

        let mut total = Decimal::new(5, 0);
        assert!(accumulate(&mut total, Decimal::new(-7, 0)));
        assert_eq!(total, Decimal::new(-2, 0));
    }

    #[test]
    fn test_largest_amount_still_parses() {
        assert_eq!(
            parse_amount("79228162514264337593543950335").unwrap(),
            Decimal::MAX
        );
        assert!(parse_amount("792281625142643375935439503350").is_err());
    }

    #[test]
    fn test_coerce_falls_back_to_zero() {
        assert_eq!(coerce_amount("abc"), Decimal::ZERO);
        assert_eq!(coerce_amount(""), Decimal::ZERO);
        assert_eq!(coerce_amount("   "), Decimal::ZERO);
        assert_eq!(coerce_amount("2"), Decimal::new(2, 0));
    }
}
