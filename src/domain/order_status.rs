use std::{fmt, str::FromStr};

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "out_for_delivery")]
    OutForDelivery,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "received_by_customer")]
    ReceivedByCustomer,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "canceled_by_vendor")]
    CanceledByVendor,
}

/// Statuses in which an order can still be picked up by a driver.
pub const ASSIGNABLE: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::Preparing];

/// Statuses a driver is allowed to set on an order assigned to them.
pub const DRIVER_SETTABLE: [OrderStatus; 2] = [OrderStatus::OutForDelivery, OrderStatus::Delivered];

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::ReceivedByCustomer => "received_by_customer",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::CanceledByVendor => "canceled_by_vendor",
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_allowed().is_empty()
    }

    pub fn is_assignable(&self) -> bool {
        ASSIGNABLE.contains(self)
    }

    pub fn next_allowed(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Preparing, Cancelled, CanceledByVendor],
            Preparing => &[OutForDelivery, CanceledByVendor],
            OutForDelivery => &[Delivered],
            Delivered => &[ReceivedByCustomer, Completed],
            ReceivedByCustomer => &[Completed],
            Completed | Cancelled | CanceledByVendor => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.next_allowed().contains(&next)
    }

    /// Checks a transition and describes the rejection when it is not allowed.
    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, String> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(format!(
                "Cannot change order status from {} to {}",
                self.as_str(),
                next.as_str()
            ))
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid order status '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_allowed() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::ReceivedByCustomer,
            OrderStatus::Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn only_pending_orders_can_be_cancelled_by_user() {
        for status in OrderStatus::iter() {
            let allowed = status.can_transition_to(OrderStatus::Cancelled);
            assert_eq!(allowed, status == OrderStatus::Pending, "{status}");
        }
    }

    #[test]
    fn terminal_states_have_no_exit() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::CanceledByVendor.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn skipping_steps_is_rejected() {
        let err = OrderStatus::Pending
            .transition(OrderStatus::Delivered)
            .unwrap_err();
        assert_eq!(err, "Cannot change order status from pending to delivered");
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!(
            "out_for_delivery".parse::<OrderStatus>(),
            Ok(OrderStatus::OutForDelivery)
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
        let json = serde_json::to_string(&OrderStatus::CanceledByVendor).unwrap();
        assert_eq!(json, "\"canceled_by_vendor\"");
    }

    #[test]
    fn assignable_statuses() {
        assert!(OrderStatus::Pending.is_assignable());
        assert!(OrderStatus::Preparing.is_assignable());
        assert!(!OrderStatus::OutForDelivery.is_assignable());
    }
}
