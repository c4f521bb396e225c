//! Outbound channels the service hands messages to. The defaults only log.

use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: Option<Value>,
}

#[async_trait]
pub trait PushSender: Send + Sync {
    /// Sends to the given device tokens and returns how many were accepted.
    async fn send(&self, tokens: &[String], message: &PushMessage) -> anyhow::Result<usize>;
}

#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send_email(&self, email: &str, code: &str) -> anyhow::Result<()>;
    async fn send_sms(&self, phone: &str, code: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, tokens: &[String], message: &PushMessage) -> anyhow::Result<usize> {
        tracing::info!(
            recipients = tokens.len(),
            title = %message.title,
            "push notification dispatched"
        );
        Ok(tokens.len())
    }
}

#[derive(Debug, Default, Clone)]
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send_email(&self, email: &str, code: &str) -> anyhow::Result<()> {
        tracing::info!(%email, %code, "email otp issued");
        Ok(())
    }

    async fn send_sms(&self, phone: &str, code: &str) -> anyhow::Result<()> {
        tracing::info!(%phone, %code, "sms otp issued");
        Ok(())
    }
}
