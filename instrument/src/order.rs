//! Order lifecycle enums shared between the execution and strategy layers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Lifecycle status of a single order, as reported by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Init,
    NewOrder,
    NewConfirm,
    NewReject,
    ModifyOrder,
    ModifyConfirm,
    ModifyReject,
    CancelOrder,
    CancelConfirm,
    CancelReject,
    Traded,
}

impl OrderStatus {
    /// An order in a terminal status can no longer receive fills or modifications.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::NewReject | OrderStatus::CancelConfirm
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Init => "init",
            OrderStatus::NewOrder => "new_order",
            OrderStatus::NewConfirm => "new_confirm",
            OrderStatus::NewReject => "new_reject",
            OrderStatus::ModifyOrder => "modify_order",
            OrderStatus::ModifyConfirm => "modify_confirm",
            OrderStatus::ModifyReject => "modify_reject",
            OrderStatus::CancelOrder => "cancel_order",
            OrderStatus::CancelConfirm => "cancel_confirm",
            OrderStatus::CancelReject => "cancel_reject",
            OrderStatus::Traded => "traded",
        };
        write!(f, "{s}")
    }
}

/// Classifies how a fill interacted with the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderHitType {
    /// Resting passively, providing liquidity.
    Standard,
    /// Improved the best price when it joined the book.
    Improve,
    /// Took liquidity across the spread.
    Cross,
    /// Detected via book-level inference rather than a direct fill report.
    Detect,
    /// Matched an external reference trade.
    Match,
}

impl Display for OrderHitType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderHitType::Standard => "standard",
            OrderHitType::Improve => "improve",
            OrderHitType::Cross => "cross",
            OrderHitType::Detect => "detect",
            OrderHitType::Match => "match",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::NewReject.is_terminal());
        assert!(OrderStatus::CancelConfirm.is_terminal());
        assert!(!OrderStatus::NewConfirm.is_terminal());
        assert!(!OrderStatus::Traded.is_terminal());
    }
}
