use async_trait::async_trait;
use domain::DomainError;
use domain::intervals::{IntervalRules, IntervalRulesRepository};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory interval rules blob
#[derive(Clone, Default)]
pub struct InMemoryIntervalRulesRepository {
    rules: Arc<RwLock<Option<IntervalRules>>>,
}

impl InMemoryIntervalRulesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: IntervalRules) -> Self {
        Self {
            rules: Arc::new(RwLock::new(Some(rules))),
        }
    }
}

#[async_trait]
impl IntervalRulesRepository for InMemoryIntervalRulesRepository {
    async fn get(&self) -> Result<Option<IntervalRules>, DomainError> {
        Ok(self.rules.read().await.clone())
    }

    async fn save(&self, rules: &IntervalRules) -> Result<(), DomainError> {
        *self.rules.write().await = Some(rules.clone());
        Ok(())
    }
}
