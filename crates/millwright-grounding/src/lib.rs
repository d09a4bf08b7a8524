//! Millwright Grounding & Citation Engine
//!
//! Validates a draft answer against the citations its tools produced:
//! extracts claims, matches each groundable claim to its best-supporting
//! citation, computes an aggregate grounding score, and applies the
//! threshold policy (deliver / deliver flagged / replace with an
//! insufficient-evidence fallback).
//!
//! The claim-extraction step is a replaceable strategy behind the
//! [`ClaimExtractor`] trait; the default is deterministic sentence
//! segmentation plus keyword classification.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod extract;
pub mod scorer;

pub use config::GroundingConfig;
pub use engine::{GroundingEngine, GroundingOutcome, ValidatedDraft};
pub use extract::{ClaimExtractor, SentenceExtractor};

use thiserror::Error;

/// Errors that can occur during grounding validation
#[derive(Error, Debug)]
pub enum GroundingError {
    /// Claim extraction failed
    #[error("Claim extraction failed: {0}")]
    Extraction(String),

    /// Configuration is inconsistent (e.g. thresholds out of order)
    #[error("Invalid grounding configuration: {0}")]
    Config(String),
}
