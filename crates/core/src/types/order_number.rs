//! Human-facing order numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An order number such as `OR-00000042`.
///
/// Numbers are allocated from the `shop.order_number_seq` database sequence,
/// so they are unique and increase monotonically. The number is fixed when the
/// order is created and no write path changes it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "OR-";

    /// Minimum digit width; larger sequence values simply grow wider.
    pub const WIDTH: usize = 8;

    /// Format a sequence value as an order number.
    ///
    /// ```
    /// use shopdesk_core::OrderNumber;
    ///
    /// assert_eq!(OrderNumber::from_sequence(42).as_str(), "OR-00000042");
    /// assert_eq!(OrderNumber::from_sequence(123_456_789).as_str(), "OR-123456789");
    /// ```
    #[must_use]
    pub fn from_sequence(value: u64) -> Self {
        Self(format!("{}{value:0width$}", Self::PREFIX, width = Self::WIDTH))
    }

    /// Wrap a number read back from storage.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// The sequence value encoded in this number, if it is well formed.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(Self::PREFIX)?.parse().ok()
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
