//! Transition types
//!
//! Key mapping, per-object outcomes and the batch-level report.

use crate::error::Result;
use bytes::Bytes;

/// Maps keys of one zone onto the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapping {
    /// Zone the objects are read from
    pub source_prefix: String,
    /// Zone the results are written to
    pub dest_prefix: String,
    /// Only keys with this suffix are picked up
    pub source_suffix: String,
    /// Suffix the destination key ends with
    pub dest_suffix: String,
}

impl KeyMapping {
    /// Create a new mapping
    pub fn new(
        source_prefix: impl Into<String>,
        dest_prefix: impl Into<String>,
        source_suffix: impl Into<String>,
        dest_suffix: impl Into<String>,
    ) -> Self {
        Self {
            source_prefix: source_prefix.into(),
            dest_prefix: dest_prefix.into(),
            source_suffix: source_suffix.into(),
            dest_suffix: dest_suffix.into(),
        }
    }

    /// Whether a listed key belongs to this transition
    pub fn matches(&self, key: &str) -> bool {
        key.starts_with(&self.source_prefix) && key.ends_with(&self.source_suffix)
    }

    /// Destination key for a source key
    ///
    /// The first occurrence of the source prefix is swapped for the
    /// destination prefix and a trailing source suffix is rewritten. Keys
    /// that do not contain the source prefix have no destination.
    pub fn map(&self, key: &str) -> Option<String> {
        let start = key.find(&self.source_prefix)?;
        let rest = &key[start + self.source_prefix.len()..];
        let rest = match rest.strip_suffix(&self.source_suffix) {
            Some(stem) => format!("{stem}{}", self.dest_suffix),
            None => rest.to_string(),
        };
        Some(format!("{}{}{rest}", &key[..start], self.dest_prefix))
    }
}

/// Payload transform applied to every object of a transition
///
/// Must be deterministic: a crash between write and delete makes the
/// source object run through the transform again.
pub trait Transform: Send + Sync {
    /// Transform one object's payload
    fn apply(&self, key: &str, data: Bytes) -> Result<Bytes>;
}

impl<F> Transform for F
where
    F: Fn(&str, Bytes) -> Result<Bytes> + Send + Sync,
{
    fn apply(&self, key: &str, data: Bytes) -> Result<Bytes> {
        self(key, data)
    }
}

/// What happened to one source object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOutcome {
    /// Written to the destination (and retired, when configured)
    Processed {
        /// Source key
        source: String,
        /// Destination key
        dest: String,
    },
    /// Left in place for a future run
    Skipped {
        /// Source key
        key: String,
        /// Why the object was skipped
        reason: String,
    },
}

impl ObjectOutcome {
    /// Check if the object was processed
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }

    /// Source key of the object
    pub fn source_key(&self) -> &str {
        match self {
            Self::Processed { source, .. } => source,
            Self::Skipped { key, .. } => key,
        }
    }
}

/// Aggregated result of one transition pass
#[derive(Debug, Clone, Default)]
pub struct TransitionReport {
    /// Per-object outcomes, in processing order
    pub outcomes: Vec<ObjectOutcome>,
    /// Set when the source zone could not be listed
    pub listing_error: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl TransitionReport {
    /// Number of processed objects
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_processed()).count()
    }

    /// Number of skipped objects
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.processed()
    }

    /// Whether there was nothing to do
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Destination keys written in this pass
    pub fn written_keys(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ObjectOutcome::Processed { dest, .. } => Some(dest.as_str()),
                ObjectOutcome::Skipped { .. } => None,
            })
            .collect()
    }

    /// Skipped objects with their reasons
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ObjectOutcome::Skipped { key, reason } => Some((key.as_str(), reason.as_str())),
                ObjectOutcome::Processed { .. } => None,
            })
            .collect()
    }
}
