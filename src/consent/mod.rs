//! Capture consent
//!
//! The host OS asks the user to approve screen capture. The controller only
//! sees the outcome: a grant token, a denial, or a failure to ask at all.

mod policy;

pub use policy::{ConsentPolicy, PolicyConsent};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque proof of consent, handed to the capture engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentToken(String);

impl ConsentToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decision returned by the consent authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentDecision {
    /// The user approved capture
    Granted(ConsentToken),
    /// The user declined
    Denied,
    /// The authority answered but could not produce a decision
    Unavailable,
}

/// Failure to dispatch the consent request
#[derive(Error, Debug)]
pub enum ConsentError {
    /// No foreground UI context to present the dialog in
    #[error("no activity context")]
    NoActivityContext,

    #[error("consent request failed: {0}")]
    Dispatch(#[from] anyhow::Error),
}

/// Consent authority trait
///
/// Implementations present the platform's capture-consent dialog and
/// resolve once the user has answered.
#[async_trait::async_trait]
pub trait ConsentAuthority: Send + Sync {
    async fn request_capture_permission(&self) -> Result<ConsentDecision, ConsentError>;
}
