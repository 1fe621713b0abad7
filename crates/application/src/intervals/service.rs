use domain::{BootNotification, DomainError, IntervalRules, IntervalRulesRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Immutable view of the interval rules at one version
#[derive(Debug, Clone, PartialEq)]
pub struct RulesSnapshot {
    pub version: u64,
    pub rules: Arc<IntervalRules>,
}

/// Serves interval rules from a snapshot swapped as a whole on replace.
///
/// Readers clone the `Arc` and never observe a half-applied update.
pub struct IntervalsService {
    repository: Arc<dyn IntervalRulesRepository>,
    snapshot: RwLock<Arc<RulesSnapshot>>,
    default_seconds: u32,
}

impl IntervalsService {
    pub fn new(repository: Arc<dyn IntervalRulesRepository>, default_seconds: u32) -> Self {
        let snapshot = RulesSnapshot {
            version: 0,
            rules: Arc::new(IntervalRules::default_rules(default_seconds)),
        };
        Self {
            repository,
            snapshot: RwLock::new(Arc::new(snapshot)),
            default_seconds,
        }
    }

    /// Refresh the snapshot from storage. A missing blob yields the default rules.
    pub async fn load(&self) -> Result<Arc<RulesSnapshot>, DomainError> {
        let rules = match self.repository.get().await? {
            Some(rules) => rules,
            None => {
                info!(
                    def_seconds = self.default_seconds,
                    "No interval rules stored, using defaults"
                );
                IntervalRules::default_rules(self.default_seconds)
            }
        };
        Ok(self.swap(rules).await)
    }

    pub async fn current(&self) -> Arc<RulesSnapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn get(&self) -> IntervalRules {
        self.current().await.rules.as_ref().clone()
    }

    pub async fn calculate_interval(&self, boot: &BootNotification) -> Duration {
        self.current().await.rules.calculate_interval(boot)
    }

    /// Validate, persist, then publish the new snapshot.
    /// Invalid rules leave both storage and the snapshot untouched.
    pub async fn replace(&self, rules: IntervalRules) -> Result<Arc<RulesSnapshot>, DomainError> {
        if let Err(e) = rules.validate() {
            warn!(error = %e, "Rejected interval rules");
            return Err(e);
        }
        self.repository.save(&rules).await?;

        let snapshot = self.swap(rules).await;
        info!(
            version = snapshot.version,
            by_ids = snapshot.rules.by_ids.len(),
            by_model = snapshot.rules.by_model.len(),
            "📐 Interval rules replaced"
        );
        Ok(snapshot)
    }

    async fn swap(&self, rules: IntervalRules) -> Arc<RulesSnapshot> {
        let mut guard = self.snapshot.write().await;
        let snapshot = Arc::new(RulesSnapshot {
            version: guard.version + 1,
            rules: Arc::new(rules),
        });
        *guard = snapshot.clone();
        snapshot
    }
}
