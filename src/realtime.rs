//! In-process fan-out of order lifecycle events to connected drivers.
//!
//! Delivery is best effort: events published while nobody listens are
//! dropped, and a subscriber that falls more than the channel capacity
//! behind skips ahead.

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{domain::OrderStatus, models::Order};

pub const ORDER_PREPARING: &str = "order:preparing";
pub const ORDER_ACCEPTED: &str = "order:accepted";
pub const ORDER_ASSIGNED: &str = "order:assigned";
pub const ORDER_STATUS_UPDATED: &str = "order:status-updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every connected delivery driver.
    Delivery,
    /// A single driver.
    Driver(Uuid),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    #[schema(example = "order:status-updated")]
    pub event: String,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct Dispatch {
    pub audience: Audience,
    pub event: OrderEvent,
}

impl Dispatch {
    pub fn reaches(&self, driver_id: Uuid) -> bool {
        match self.audience {
            Audience::Delivery => true,
            Audience::Driver(id) => id == driver_id,
        }
    }
}

#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<Dispatch>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Dispatch> {
        self.tx.subscribe()
    }

    pub fn publish(&self, audience: Audience, name: &str, order: &Order) {
        let event = OrderEvent {
            event: name.to_string(),
            order_id: order.id,
            status: order.status,
            data: serde_json::to_value(order).unwrap_or(serde_json::Value::Null),
        };
        match self.tx.send(Dispatch { audience, event }) {
            Ok(receivers) => {
                tracing::debug!(event = name, order_id = %order.id, receivers, "event published")
            }
            Err(_) => tracing::debug!(event = name, order_id = %order.id, "no subscribers"),
        }
    }

    /// Announces a status change. Entering `preparing` also advertises the order to drivers.
    pub fn status_changed(&self, order: &Order) {
        if order.status == OrderStatus::Preparing && order.driver_id.is_none() {
            self.publish(Audience::Delivery, ORDER_PREPARING, order);
        }
        self.publish(Audience::Delivery, ORDER_STATUS_UPDATED, order);
    }

    /// Tells drivers the order is taken and tells the assignee it is theirs.
    pub fn order_assigned(&self, order: &Order, driver_id: Uuid) {
        self.publish(Audience::Delivery, ORDER_ACCEPTED, order);
        self.publish(Audience::Driver(driver_id), ORDER_ASSIGNED, order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentMethod;
    use chrono::Utc;

    fn order(status: OrderStatus, driver_id: Option<Uuid>) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-20260101-00000000".into(),
            user_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            address_id: Uuid::new_v4(),
            delivery_area_id: Uuid::new_v4(),
            driver_id,
            coupon_id: None,
            status,
            payment_method: PaymentMethod::Cash,
            subtotal: 1_000,
            discount: 0,
            delivery_fee: 200,
            total: 1_200,
            notes: None,
            cancel_reason: None,
            items: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn preparing_is_advertised_before_status_update() {
        let hub = EventHub::new(8);
        let mut rx = hub.subscribe();
        hub.status_changed(&order(OrderStatus::Preparing, None));

        assert_eq!(rx.recv().await.unwrap().event.event, ORDER_PREPARING);
        assert_eq!(rx.recv().await.unwrap().event.event, ORDER_STATUS_UPDATED);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn assignment_is_private_to_the_driver() {
        let hub = EventHub::new(8);
        let mut rx = hub.subscribe();
        let driver = Uuid::new_v4();
        let other = Uuid::new_v4();
        hub.order_assigned(&order(OrderStatus::Preparing, Some(driver)), driver);

        let accepted = rx.recv().await.unwrap();
        assert_eq!(accepted.event.event, ORDER_ACCEPTED);
        assert!(accepted.reaches(other));

        let assigned = rx.recv().await.unwrap();
        assert_eq!(assigned.event.event, ORDER_ASSIGNED);
        assert!(assigned.reaches(driver));
        assert!(!assigned.reaches(other));
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let hub = EventHub::new(1);
        hub.status_changed(&order(OrderStatus::Delivered, None));
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_ahead() {
        let hub = EventHub::new(2);
        let mut rx = hub.subscribe();
        let o = order(OrderStatus::OutForDelivery, None);
        for _ in 0..5 {
            hub.publish(Audience::Delivery, ORDER_STATUS_UPDATED, &o);
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert!(rx.recv().await.is_ok());
    }
}
