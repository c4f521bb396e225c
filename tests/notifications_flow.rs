mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{create_user, database_state};
use food_delivery_api::{
    domain::{NotificationTarget, Platform, UserRole},
    dto::{fcm::RegisterFcmTokenRequest, notifications::SendNotificationRequest},
    entity::Notifications,
    notify::{PushMessage, PushSender},
    services::{fcm_service, notification_service},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

struct DownPush;

#[async_trait]
impl PushSender for DownPush {
    async fn send(&self, _tokens: &[String], _message: &PushMessage) -> anyhow::Result<usize> {
        anyhow::bail!("push gateway unavailable")
    }
}

// A failing push channel still records the notification, with nobody reached.
#[tokio::test]
async fn failed_push_records_zero_recipients() -> anyhow::Result<()> {
    let Some(mut state) = database_state("notify-secret").await? else {
        return Ok(());
    };
    state.push = Arc::new(DownPush);
    let admin = create_user(&state, UserRole::Admin).await?;
    let customer = create_user(&state, UserRole::User).await?;
    fcm_service::register_token(
        &state,
        &customer,
        RegisterFcmTokenRequest {
            token: format!("device-{}", Uuid::new_v4().simple()),
            platform: Platform::Android,
        },
    )
    .await?;

    let receipt = notification_service::send_to_users(
        &state,
        &admin,
        SendNotificationRequest {
            user_ids: vec![customer.user_id],
            title: "Order update".into(),
            body: "Your food is on its way".into(),
            data: None,
        },
    )
    .await?
    .data
    .expect("receipt");
    assert_eq!(receipt.recipient_count, 0);
    assert_eq!(receipt.target, NotificationTarget::Selected);

    let stored = Notifications::find_by_id(receipt.notification_id)
        .one(&state.orm)
        .await?
        .expect("stored notification");
    assert_eq!(stored.recipient_count, 0);

    Ok(())
}
