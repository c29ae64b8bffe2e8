use crate::domain::entities::{ActionSpec, Conversation, Trigger};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::clock::Clock;
use crate::domain::ports::trigger_repository::TriggerRepository;
use crate::domain::services::condition_registry::{ConditionMeta, ConditionRegistry};
use crate::domain::services::conditions::EvaluationContext;
use crate::domain::services::trigger_rule_set::TriggerRuleSet;
use serde::Serialize;
use std::sync::Arc;

/// A trigger whose conditions all matched, with the actions the caller should run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerMatch {
    pub trigger_id: String,
    pub trigger_name: String,
    pub actions: Vec<ActionSpec>,
}

impl From<&Trigger> for TriggerMatch {
    fn from(trigger: &Trigger) -> Self {
        Self {
            trigger_id: trigger.id.clone(),
            trigger_name: trigger.name.clone(),
            actions: trigger.actions().to_vec(),
        }
    }
}

/// Matches found for one conversation during a time based sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationMatches {
    pub conversation_id: String,
    pub matches: Vec<TriggerMatch>,
}

#[derive(Clone)]
pub struct TriggerService {
    trigger_repo: Arc<dyn TriggerRepository>,
    rule_set: TriggerRuleSet,
    clock: Arc<dyn Clock>,
}

impl TriggerService {
    pub fn new(
        trigger_repo: Arc<dyn TriggerRepository>,
        registry: Arc<ConditionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trigger_repo,
            rule_set: TriggerRuleSet::new(registry),
            clock,
        }
    }

    /// Evaluate enabled triggers for a created (`prior == None`) or updated conversation
    pub async fn handle_conversation_event(
        &self,
        conversation: &Conversation,
        prior: Option<&Conversation>,
    ) -> DomainResult<Vec<TriggerMatch>> {
        let event = if prior.is_some() { "updated" } else { "created" };
        tracing::info!(
            "Processing triggers for conversation {} ({})",
            conversation.id,
            event
        );

        // Get enabled triggers
        let triggers = self.trigger_repo.get_enabled_triggers().await?;
        if triggers.is_empty() {
            tracing::debug!("No enabled triggers found");
            return Ok(Vec::new());
        }

        // Updates carry the previous snapshot for status_changed
        let ctx = EvaluationContext {
            conversation,
            prior,
            now: self.clock.now(),
        };

        let candidates: Vec<&Trigger> = triggers.iter().collect();
        Ok(self.fire(&candidates, &ctx).await)
    }

    /// Re-evaluate time based triggers against conversations, with no prior state
    pub async fn run_time_based_sweep(
        &self,
        conversations: &[Conversation],
    ) -> DomainResult<Vec<ConversationMatches>> {
        // Only triggers with at least one time based condition take part
        let triggers = self.trigger_repo.get_enabled_triggers().await?;
        let time_based = self.rule_set.get_all_where_time_based(&triggers, true);

        tracing::info!(
            "Time based sweep: {} trigger(s) over {} conversation(s)",
            time_based.len(),
            conversations.len()
        );

        let now = self.clock.now();
        let mut results = Vec::new();

        for conversation in conversations {
            // No prior state on a sweep
            let ctx = EvaluationContext::created(conversation, now);
            let matches = self.fire(&time_based, &ctx).await;
            if !matches.is_empty() {
                results.push(ConversationMatches {
                    conversation_id: conversation.id.clone(),
                    matches,
                });
            }
        }

        Ok(results)
    }

    /// All stored triggers that do (or do not) depend on elapsed time
    pub async fn get_all_where_time_based(
        &self,
        is_time_based: bool,
    ) -> DomainResult<Vec<Trigger>> {
        let triggers = self.trigger_repo.get_triggers().await?;
        Ok(self
            .rule_set
            .get_all_where_time_based(&triggers, is_time_based)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn fire(&self, triggers: &[&Trigger], ctx: &EvaluationContext<'_>) -> Vec<TriggerMatch> {
        let mut matches = Vec::new();

        for trigger in triggers {
            metrics::counter!("triggers_evaluated_total").increment(1);

            // All conditions must hold
            if !self.rule_set.evaluate(trigger, ctx) {
                continue;
            }

            tracing::info!(
                "Trigger '{}' ({}) fired for conversation {} with {} action(s)",
                trigger.name,
                trigger.id,
                ctx.conversation.id,
                trigger.actions().len()
            );
            metrics::counter!("triggers_fired_total").increment(1);

            // A failed counter update must not hide the match from the caller
            if let Err(e) = self.trigger_repo.increment_times_fired(&trigger.id).await {
                tracing::error!("Failed to record firing of trigger '{}': {}", trigger.name, e);
            }

            matches.push(TriggerMatch::from(*trigger));
        }

        matches
    }

    // Administration

    pub async fn create_trigger(&self, mut trigger: Trigger) -> DomainResult<Trigger> {
        trigger.validate(self.rule_set.registry())?;

        let now = self.clock.now();
        trigger.created_at = now;
        trigger.updated_at = now;

        self.trigger_repo.create_trigger(&trigger).await?;
        tracing::info!("Created trigger '{}' ({})", trigger.name, trigger.id);
        Ok(trigger)
    }

    pub async fn update_trigger(&self, mut trigger: Trigger) -> DomainResult<Trigger> {
        trigger.validate(self.rule_set.registry())?;

        let existing = self.get_trigger(&trigger.id).await?;
        trigger.created_at = existing.created_at;
        trigger.times_fired = existing.times_fired;
        trigger.updated_at = self.clock.now();

        self.trigger_repo.update_trigger(&trigger).await?;
        tracing::info!("Updated trigger '{}' ({})", trigger.name, trigger.id);
        Ok(trigger)
    }

    pub async fn get_trigger(&self, id: &str) -> DomainResult<Trigger> {
        self.trigger_repo
            .get_trigger_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Trigger {}", id)))
    }

    pub async fn list_triggers(&self) -> DomainResult<Vec<Trigger>> {
        self.trigger_repo.get_triggers().await
    }

    pub async fn delete_triggers(&self, ids: &[String]) -> DomainResult<usize> {
        let deleted = self.trigger_repo.delete_triggers(ids).await?;
        tracing::info!("Deleted {} of {} requested trigger(s)", deleted, ids.len());
        Ok(deleted)
    }

    /// Registry metadata for building trigger editors
    pub fn available_conditions(&self) -> Vec<&ConditionMeta> {
        self.rule_set.registry().describe()
    }
}
