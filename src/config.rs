//! Configuration types for highlight replay.
//!
//! All replay behaviour is controlled through [`ReplayConfig`], built via its
//! [`ReplayConfigBuilder`]. Defaults match what the notes tooling writes: the
//! record lives in the `HIGHLIGHT` property and a malformed record is skipped
//! rather than failing a whole batch.

use crate::error::ReplayError;
use crate::notes::HIGHLIGHT_PROPERTY;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a replay call.
///
/// Built via [`ReplayConfig::builder()`] or using [`ReplayConfig::default()`].
///
/// # Example
/// ```rust
/// use noter_replay::{FailurePolicy, ReplayConfig};
///
/// let config = ReplayConfig::builder()
///     .property("HIGHLIGHT")
///     .failure_policy(FailurePolicy::Abort)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReplayConfig {
    /// Heading property holding the highlight record. Default: `HIGHLIGHT`.
    pub property: String,

    /// What a batch does with an entry that fails. Default:
    /// [`FailurePolicy::SkipAndContinue`].
    pub failure_policy: FailurePolicy,

    /// Optional per-entry event sink for batch replay.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            property: HIGHLIGHT_PROPERTY.to_string(),
            failure_policy: FailurePolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReplayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayConfig")
            .field("property", &self.property)
            .field("failure_policy", &self.failure_policy)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ReplayProgressCallback>"),
            )
            .finish()
    }
}

impl ReplayConfig {
    /// Create a new builder for `ReplayConfig`.
    pub fn builder() -> ReplayConfigBuilder {
        ReplayConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReplayConfig`].
#[derive(Debug)]
pub struct ReplayConfigBuilder {
    config: ReplayConfig,
}

impl ReplayConfigBuilder {
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.config.property = name.into();
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReplayConfig, ReplayError> {
        let name = &self.config.property;
        if name.is_empty() {
            return Err(ReplayError::InvalidConfig(
                "Property name must not be empty".into(),
            ));
        }
        if name.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(ReplayError::InvalidConfig(format!(
                "Property name must not contain whitespace or ':', got {name:?}"
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How a batch replay treats an entry that cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Record the failure in the report and carry on with the next entry.
    /// The applied count covers successes only. (default)
    #[default]
    SkipAndContinue,
    /// Stop at the first failure and return it. Malformed records are found
    /// before any annotation is made, so nothing is applied in that case.
    Abort,
}
