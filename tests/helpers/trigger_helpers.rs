#![allow(dead_code)]
use super::test_now;
use deskrules::domain::entities::{ActionSpec, ConditionSpec, Trigger, TriggerConfig};
use deskrules::domain::ports::trigger_repository::TriggerRepository;
use deskrules::domain::services::ConditionRegistry;
use deskrules::infrastructure::persistence::InMemoryTriggerRepository;
use deskrules::infrastructure::runtime::FixedClock;
use deskrules::TriggerService;
use serde_json::Value;
use std::sync::Arc;

pub fn condition(name: &str, operator: &str, value: Value) -> ConditionSpec {
    ConditionSpec::new(name, operator, value)
}

pub fn create_test_trigger(
    name: &str,
    conditions: Vec<ConditionSpec>,
    actions: Vec<ActionSpec>,
) -> Trigger {
    Trigger::new(name.to_string(), TriggerConfig { conditions, actions })
}

pub struct TestService {
    pub repo: Arc<InMemoryTriggerRepository>,
    pub service: TriggerService,
}

/// Trigger service over an in-memory repository seeded with `triggers`,
/// default registry and a clock fixed at `test_now()`
pub async fn setup_trigger_service(triggers: Vec<Trigger>) -> TestService {
    let repo = Arc::new(InMemoryTriggerRepository::new());
    for trigger in &triggers {
        repo.create_trigger(trigger)
            .await
            .expect("Failed to seed trigger");
    }

    let service = TriggerService::new(
        repo.clone(),
        Arc::new(ConditionRegistry::with_defaults()),
        Arc::new(FixedClock(test_now())),
    );

    TestService { repo, service }
}
