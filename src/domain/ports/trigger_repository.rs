use crate::domain::errors::DomainResult;
use crate::domain::entities::Trigger;

/// Storage for triggers
#[async_trait::async_trait]
pub trait TriggerRepository: Send + Sync {
    /// Enabled triggers in creation order
    async fn get_enabled_triggers(&self) -> DomainResult<Vec<Trigger>>;

    /// All triggers in creation order
    async fn get_triggers(&self) -> DomainResult<Vec<Trigger>>;

    async fn get_trigger_by_id(&self, id: &str) -> DomainResult<Option<Trigger>>;

    async fn create_trigger(&self, trigger: &Trigger) -> DomainResult<()>;

    async fn update_trigger(&self, trigger: &Trigger) -> DomainResult<()>;

    /// Delete every trigger in `ids`, returning how many existed
    async fn delete_triggers(&self, ids: &[String]) -> DomainResult<usize>;

    async fn increment_times_fired(&self, id: &str) -> DomainResult<()>;
}
