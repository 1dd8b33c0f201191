//! Prices and order line totals using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(8, 2)`: at most six integer digits and two
//! fractional digits, never negative. Line totals are computed on demand and
//! never persisted.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a plain decimal number.
    #[error("price must be a number such as 19.99")]
    Format,
    /// Too many digits before the decimal point.
    #[error("price must have at most {max} digits before the decimal point")]
    IntegerDigits {
        /// Maximum integer digits.
        max: usize,
    },
    /// Too many digits after the decimal point.
    #[error("price must have at most {max} digits after the decimal point")]
    FractionDigits {
        /// Maximum fractional digits.
        max: usize,
    },
}

/// A non-negative monetary amount with at most two decimal places.
///
/// ```
/// use shopdesk_core::Price;
///
/// let price = Price::parse("149.5").unwrap();
/// assert_eq!(price.to_string(), "149.50");
///
/// assert!(Price::parse("1234567").is_err());
/// assert!(Price::parse("9.999").is_err());
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Maximum digits before the decimal point.
    pub const MAX_INTEGER_DIGITS: usize = 6;

    /// Maximum digits after the decimal point.
    pub const MAX_FRACTION_DIGITS: usize = 2;

    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a price from user input such as `"19"`, `"19.9"` or `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the input is not an unsigned decimal with
    /// 1-6 integer digits and 0-2 fractional digits.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceError::Empty);
        }

        let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(PriceError::Format);
        }
        if int_part.len() > Self::MAX_INTEGER_DIGITS {
            return Err(PriceError::IntegerDigits {
                max: Self::MAX_INTEGER_DIGITS,
            });
        }
        if frac_part.len() > Self::MAX_FRACTION_DIGITS {
            return Err(PriceError::FractionDigits {
                max: Self::MAX_FRACTION_DIGITS,
            });
        }

        let normalized = if frac_part.is_empty() {
            int_part.to_owned()
        } else {
            format!("{int_part}.{frac_part}")
        };
        let amount = normalized
            .parse::<Decimal>()
            .map_err(|_| PriceError::Format)?;
        Ok(Self(amount))
    }

    /// Wrap an already-validated decimal, e.g. a value read from the database.
    ///
    /// Negative amounts are clamped to zero and the scale is rounded to two
    /// places.
    #[must_use]
    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount.max(Decimal::ZERO).round_dp(2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0;
        amount.rescale(2);
        write!(f, "{amount}")
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Compute `quantity × unit_price` exactly.
///
/// Negative quantities contribute nothing; the order form never stores them.
#[must_use]
pub fn line_total(quantity: i32, unit_price: Price) -> Decimal {
    Decimal::from(quantity.max(0)) * unit_price.amount()
}

/// The pricing inputs of one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Units ordered.
    pub quantity: i32,
    /// Price per unit captured when the product was chosen.
    pub unit_price: Price,
}

impl LineItem {
    /// Display total for this line.
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.quantity, self.unit_price)
    }

    /// Sum of line totals plus shipping.
    #[must_use]
    pub fn grand_total(items: &[Self], shipping: Price) -> Decimal {
        items.iter().map(Self::total).sum::<Decimal>() + shipping.amount()
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_accepts_price_formats() {
        assert_eq!(Price::parse("0").unwrap().amount(), dec("0"));
        assert_eq!(Price::parse("19.9").unwrap().amount(), dec("19.9"));
        assert_eq!(Price::parse("999999.99").unwrap().amount(), dec("999999.99"));
        assert_eq!(Price::parse("12.").unwrap().amount(), dec("12"));
        assert_eq!(Price::parse(" 5.05 ").unwrap().amount(), dec("5.05"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert_eq!(Price::parse("abc"), Err(PriceError::Format));
        assert_eq!(Price::parse("-3"), Err(PriceError::Format));
        assert_eq!(Price::parse(".50"), Err(PriceError::Format));
        assert_eq!(Price::parse("1e3"), Err(PriceError::Format));
        assert_eq!(
            Price::parse("1000000"),
            Err(PriceError::IntegerDigits { max: 6 })
        );
        assert_eq!(
            Price::parse("1.234"),
            Err(PriceError::FractionDigits { max: 2 })
        );
    }

    #[test]
    fn test_display_always_two_places() {
        assert_eq!(Price::parse("7").unwrap().to_string(), "7.00");
        assert_eq!(Price::parse("7.5").unwrap().to_string(), "7.50");
        assert_eq!(Price::parse("7.25").unwrap().to_string(), "7.25");
    }

    #[test]
    fn test_from_decimal_clamps_negative() {
        assert_eq!(Price::from_decimal(dec("-4.00")), Price::ZERO);
        assert_eq!(Price::from_decimal(dec("4.005")).amount(), dec("4.00"));
    }

    #[test]
    fn test_line_total_is_exact_product() {
        let price = Price::parse("19.99").unwrap();
        assert_eq!(line_total(3, price), dec("59.97"));
        assert_eq!(line_total(0, price), Decimal::ZERO);
        assert_eq!(line_total(1, Price::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_tracks_inputs() {
        let mut item = LineItem {
            quantity: 2,
            unit_price: Price::parse("10.10").unwrap(),
        };
        assert_eq!(item.total(), dec("20.20"));

        item.quantity = 5;
        assert_eq!(item.total(), dec("50.50"));

        item.unit_price = Price::parse("0.01").unwrap();
        assert_eq!(item.total(), dec("0.05"));
    }

    #[test]
    fn test_grand_total_adds_shipping() {
        let items = [
            LineItem {
                quantity: 2,
                unit_price: Price::parse("5.00").unwrap(),
            },
            LineItem {
                quantity: 1,
                unit_price: Price::parse("2.50").unwrap(),
            },
        ];
        let total = LineItem::grand_total(&items, Price::parse("4.99").unwrap());
        assert_eq!(total, dec("17.49"));
        assert_eq!(LineItem::grand_total(&[], Price::ZERO), Decimal::ZERO);
    }
}
