use crate::domain::entities::Trigger;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::trigger_repository::TriggerRepository;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local trigger store, kept in creation order
#[derive(Debug, Default)]
pub struct InMemoryTriggerRepository {
    triggers: RwLock<Vec<Trigger>>,
}

impl InMemoryTriggerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_triggers(triggers: Vec<Trigger>) -> Self {
        Self {
            triggers: RwLock::new(triggers),
        }
    }
}

#[async_trait]
impl TriggerRepository for InMemoryTriggerRepository {
    async fn get_enabled_triggers(&self) -> DomainResult<Vec<Trigger>> {
        let triggers = self.triggers.read().await;
        Ok(triggers.iter().filter(|t| t.enabled).cloned().collect())
    }

    async fn get_triggers(&self) -> DomainResult<Vec<Trigger>> {
        Ok(self.triggers.read().await.clone())
    }

    async fn get_trigger_by_id(&self, id: &str) -> DomainResult<Option<Trigger>> {
        let triggers = self.triggers.read().await;
        Ok(triggers.iter().find(|t| t.id == id).cloned())
    }

    async fn create_trigger(&self, trigger: &Trigger) -> DomainResult<()> {
        let mut triggers = self.triggers.write().await;
        if triggers.iter().any(|t| t.id == trigger.id) {
            return Err(DomainError::Conflict(format!(
                "Trigger {} already exists",
                trigger.id
            )));
        }
        triggers.push(trigger.clone());
        Ok(())
    }

    async fn update_trigger(&self, trigger: &Trigger) -> DomainResult<()> {
        let mut triggers = self.triggers.write().await;
        let existing = triggers
            .iter_mut()
            .find(|t| t.id == trigger.id)
            .ok_or_else(|| DomainError::NotFound(format!("Trigger {}", trigger.id)))?;
        *existing = trigger.clone();
        Ok(())
    }

    async fn delete_triggers(&self, ids: &[String]) -> DomainResult<usize> {
        let mut triggers = self.triggers.write().await;
        let before = triggers.len();
        triggers.retain(|t| !ids.contains(&t.id));
        Ok(before - triggers.len())
    }

    async fn increment_times_fired(&self, id: &str) -> DomainResult<()> {
        let mut triggers = self.triggers.write().await;
        let trigger = triggers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Trigger {}", id)))?;
        trigger.times_fired += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TriggerConfig;

    #[tokio::test]
    async fn test_crud_round_trip() {
        let repo = InMemoryTriggerRepository::new();
        let first = Trigger::new("First".to_string(), TriggerConfig::default());
        let mut second = Trigger::new("Second".to_string(), TriggerConfig::default());
        second.enabled = false;

        repo.create_trigger(&first).await.unwrap();
        repo.create_trigger(&second).await.unwrap();
        assert!(matches!(
            repo.create_trigger(&first).await,
            Err(DomainError::Conflict(_))
        ));

        assert_eq!(repo.get_triggers().await.unwrap().len(), 2);
        let enabled = repo.get_enabled_triggers().await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].name, "First");

        repo.increment_times_fired(&first.id).await.unwrap();
        let stored = repo.get_trigger_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.times_fired, 1);

        let deleted = repo
            .delete_triggers(&[first.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.get_trigger_by_id(&first.id).await.unwrap().is_none());
        assert!(matches!(
            repo.update_trigger(&first).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
