//! Enumerations stored on products and orders, plus the order badge style.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known enum value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet worked on.
    #[default]
    Pending,
    /// Being picked, packed or shipped.
    Processing,
    /// Delivered.
    Completed,
    /// Rejected or cancelled.
    Declined,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Declined,
    ];

    /// Stored value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Declined => "declined",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Declined => "Declined",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "order status",
                value: s.to_owned(),
            })
    }
}

/// How a product reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.product_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Downloadable,
    Deliverable,
}

impl ProductType {
    /// Every product type.
    pub const ALL: [Self; 2] = [Self::Downloadable, Self::Deliverable];

    /// Stored value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Downloadable => "downloadable",
            Self::Deliverable => "deliverable",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Downloadable => "Downloadable",
            Self::Deliverable => "Deliverable",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "product type",
                value: s.to_owned(),
            })
    }
}

/// Emphasis of the orders navigation badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStyle {
    Normal,
    Urgent,
}

impl BadgeStyle {
    /// Processing-order count at which the badge turns urgent.
    pub const URGENT_THRESHOLD: i64 = 10;

    /// Style for a given number of orders in `processing`.
    ///
    /// ```
    /// use shopdesk_core::BadgeStyle;
    ///
    /// assert_eq!(BadgeStyle::for_processing_orders(9), BadgeStyle::Normal);
    /// assert_eq!(BadgeStyle::for_processing_orders(10), BadgeStyle::Urgent);
    /// ```
    #[must_use]
    pub const fn for_processing_orders(count: i64) -> Self {
        if count >= Self::URGENT_THRESHOLD {
            Self::Urgent
        } else {
            Self::Normal
        }
    }

    /// Stored/serialized value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Urgent => "urgent",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parse_and_display_agree() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    #[test]
    fn test_order_status_rejects_unknown() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid order status: shipped");
        assert!("Pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_product_type_parse() {
        assert_eq!(
            "deliverable".parse::<ProductType>().unwrap(),
            ProductType::Deliverable
        );
        assert!("physical".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_badge_threshold_boundary() {
        assert_eq!(BadgeStyle::for_processing_orders(0), BadgeStyle::Normal);
        assert_eq!(BadgeStyle::for_processing_orders(9), BadgeStyle::Normal);
        assert_eq!(BadgeStyle::for_processing_orders(10), BadgeStyle::Urgent);
        assert_eq!(BadgeStyle::for_processing_orders(250), BadgeStyle::Urgent);
    }

    #[test]
    fn test_serde_uses_stored_values() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&BadgeStyle::Urgent).unwrap(),
            "\"urgent\""
        );
    }
}
