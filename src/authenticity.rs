//! Authenticity and freshness collaborators.
//!
//! Both checks depend on infrastructure outside this crate (zkTLS proof
//! verification, the marketplace's submission history). They are expressed
//! as traits with permissive stub defaults so the pipeline is runnable and
//! testable before real implementations exist.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{IdentityHash, Submission};

/// Opaque authenticity-proof artifact accompanying a chat export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticityProof(serde_json::Value);

impl AuthenticityProof {
    /// Wrap a decoded proof document.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Raw proof document.
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Error from the authenticity collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticityError {
    /// The proof could not be checked at all.
    #[error("Authenticity verification unavailable: {0}")]
    Unavailable(String),
    /// The proof document is not in the expected shape.
    #[error("Malformed authenticity proof: {0}")]
    MalformedProof(String),
}

/// Decides whether a submission's content is authentic.
///
/// Contract: returns `Ok(true)` only if the proof attests the exported
/// content. The orchestrator treats `Err` as not authentic.
#[async_trait]
pub trait AuthenticityVerifier: Send + Sync {
    /// Verify `submission` against `proof`.
    async fn verify(&self, submission: &Submission, proof: &AuthenticityProof) -> Result<bool, AuthenticityError>;
}

/// Accepts every submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

#[async_trait]
impl AuthenticityVerifier for AcceptAllVerifier {
    async fn verify(&self, _submission: &Submission, _proof: &AuthenticityProof) -> Result<bool, AuthenticityError> {
        Ok(true)
    }
}

/// Reports how fresh a submission is for an identity.
///
/// Contract: 1.0 means no recent submission from this account; values near
/// 0 mean the account is inside its cooldown window. The result is recorded
/// in the proof attributes.
#[async_trait]
pub trait SubmissionCooldown: Send + Sync {
    /// Freshness in [0, 1] for `identity`.
    async fn freshness(&self, identity: &IdentityHash) -> f64;
}

/// Treats every submission as fresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFresh;

#[async_trait]
impl SubmissionCooldown for AlwaysFresh {
    async fn freshness(&self, _identity: &IdentityHash) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataSource, Identity};
    use chrono::Utc;

    #[tokio::test]
    async fn test_stub_defaults() {
        let identity = Identity::new(DataSource::Telegram, "alice", "salt");
        let submission = Submission::new(identity.clone(), Utc::now(), vec![]).unwrap();
        let proof = AuthenticityProof::new(serde_json::json!({}));

        assert!(AcceptAllVerifier.verify(&submission, &proof).await.unwrap());
        assert_eq!(AlwaysFresh.freshness(identity.hash()).await, 1.0);
    }
}
