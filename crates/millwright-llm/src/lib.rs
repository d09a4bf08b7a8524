//! Millwright Narrator Layer
//!
//! Pluggable implementations of the [`millwright_domain::Narrator`] trait,
//! which turns an assembled answer outline into the prose delivered to the
//! user.
//!
//! # Narrators
//!
//! - [`TemplateNarrator`]: deterministic formatting, no model involved. The
//!   default; answers stay verbatim-faithful to what the tools produced.
//! - [`OllamaNarrator`]: local Ollama API integration for free-form prose.
//! - [`MockNarrator`]: deterministic mock for testing.
//!
//! # Examples
//!
//! ```
//! use millwright_llm::TemplateNarrator;
//! use millwright_domain::Narrator;
//!
//! let narrator = TemplateNarrator::default();
//! let prose = narrator.narrate("Line one.\n\n\nLine two.").unwrap();
//! assert_eq!(prose, "Line one.\n\nLine two.");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use millwright_domain::Narrator;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaNarrator;

/// Errors that can occur during narration
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the model
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Narration error: {0}")]
    Other(String),
}

/// Deterministic narrator that formats the outline without a model.
///
/// Collapses runs of blank lines and trims trailing whitespace, leaving the
/// tool-derived wording untouched. Because no model paraphrases anything,
/// every number in the output is one a tool produced, which keeps the
/// grounding check tight.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl Narrator for TemplateNarrator {
    type Error = LlmError;

    fn narrate(&self, outline: &str) -> Result<String, Self::Error> {
        let mut paragraphs: Vec<&str> = Vec::new();
        for block in outline.split("\n\n") {
            let block = block.trim();
            if !block.is_empty() {
                paragraphs.push(block);
            }
        }
        Ok(paragraphs.join("\n\n"))
    }
}

/// Mock narrator for deterministic testing.
///
/// Returns pre-configured responses without touching the network.
#[derive(Debug, Clone)]
pub struct MockNarrator {
    default_response: Option<String>,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockNarrator {
    /// Create a mock returning a fixed response for every outline
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: Some(response.into()),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a mock that echoes each outline back unchanged
    pub fn echo() -> Self {
        Self {
            default_response: None,
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a specific response for a given outline
    pub fn add_response(&mut self, outline: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(outline.into(), response.into());
    }

    /// Number of times `narrate` was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for MockNarrator {
    fn default() -> Self {
        Self::echo()
    }
}

impl Narrator for MockNarrator {
    type Error = LlmError;

    fn narrate(&self, outline: &str) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap_or_else(|p| p.into_inner()) += 1;

        let responses = self.responses.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(response) = responses.get(outline) {
            return Ok(response.clone());
        }
        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Ok(outline.to_string()),
        }
    }
}
