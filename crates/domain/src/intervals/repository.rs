use super::IntervalRules;
use crate::DomainError;
use async_trait::async_trait;

/// Storage for the single interval rules configuration blob.
/// Rules are always replaced wholesale.
#[async_trait]
pub trait IntervalRulesRepository: Send + Sync {
    /// `None` when no rules were ever saved
    async fn get(&self) -> Result<Option<IntervalRules>, DomainError>;

    async fn save(&self, rules: &IntervalRules) -> Result<(), DomainError>;
}
