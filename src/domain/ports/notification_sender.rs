use crate::domain::errors::SlaResult;

/// Outbound notification transport. Delivery (and template rendering) live
/// with the host product; the escalation service only hands over structured
/// data and must never block on transport failures.
#[async_trait::async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_in_app(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        metadata: serde_json::Value,
    ) -> SlaResult<()>;

    async fn send_email(
        &self,
        user_id: &str,
        email: &str,
        template_name: &str,
        template_data: serde_json::Value,
    ) -> SlaResult<()>;
}
