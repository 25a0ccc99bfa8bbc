use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::AppError;

/// Order payment status.
///
/// `Pending` is the only state with outgoing transitions; the other three
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Canceled,
    Expired,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Canceled,
        OrderStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// pending → {paid, canceled, expired}; nothing else.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        *self == OrderStatus::Pending && target.is_terminal()
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "⏳",
            OrderStatus::Paid => "✅",
            OrderStatus::Canceled => "❌",
            OrderStatus::Expired => "⌛",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            // both spellings show up in stored data
            "canceled" | "cancelled" => Ok(OrderStatus::Canceled),
            "expired" => Ok(OrderStatus::Expired),
            other => Err(AppError::Validation(format!("unknown order status '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_can_move() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = from == OrderStatus::Pending && to != OrderStatus::Pending;
                assert_eq!(from.can_transition_to(to), expected, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_parse_and_display_agree() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!("Cancelled".parse::<OrderStatus>().unwrap(), OrderStatus::Canceled);
        assert!("refunded".parse::<OrderStatus>().is_err());
    }
}
