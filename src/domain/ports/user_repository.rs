use crate::domain::entities::User;
use crate::domain::errors::SlaResult;

/// Read-only user lookup, used to address escalation notifications.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, user_id: &str) -> SlaResult<Option<User>>;
}
