use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::{ConsentAuthority, ConsentDecision, ConsentError, ConsentToken};

/// Fixed answer given by `PolicyConsent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentPolicy {
    #[default]
    Grant,
    Deny,
    Unavailable,
    NoContext,
}

/// Headless consent authority that answers per a configured policy
///
/// For hosts without an interactive consent dialog (servers, CI), where
/// consent is decided by deployment configuration.
#[derive(Debug, Clone)]
pub struct PolicyConsent {
    policy: ConsentPolicy,
    delay: Duration,
}

impl PolicyConsent {
    pub fn new(policy: ConsentPolicy) -> Self {
        Self {
            policy,
            delay: Duration::ZERO,
        }
    }

    /// Simulate the time a user spends on the dialog
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn policy(&self) -> ConsentPolicy {
        self.policy
    }
}

#[async_trait::async_trait]
impl ConsentAuthority for PolicyConsent {
    async fn request_capture_permission(&self) -> Result<ConsentDecision, ConsentError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        info!("Answering capture consent by policy: {:?}", self.policy);

        match self.policy {
            ConsentPolicy::Grant => Ok(ConsentDecision::Granted(ConsentToken::new(format!(
                "policy-{}",
                uuid::Uuid::new_v4()
            )))),
            ConsentPolicy::Deny => Ok(ConsentDecision::Denied),
            ConsentPolicy::Unavailable => Ok(ConsentDecision::Unavailable),
            ConsentPolicy::NoContext => Err(ConsentError::NoActivityContext),
        }
    }
}
