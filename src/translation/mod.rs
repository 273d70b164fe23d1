//! # Translation Module
//!
//! Everything between a batch of source titles and the texts written back:
//!
//! - [`prompt`]: instruction template and numbered-list rendering
//! - [`client`]: the text-generation seam ([`TextGenerator`]) and the batch
//!   [`TranslationClient`] that retries it
//! - [`aligner`]: numbered-line parsing and positional reconciliation
//! - [`terminology`]: glossary and timezone fix-ups

pub mod aligner;
pub mod client;
pub mod prompt;
pub mod terminology;

use thiserror::Error;

pub use aligner::{align, AlignedBatch, AlignmentReport};
pub use client::{OpenAiChatClient, TextGenerator, TranslationClient};
pub use prompt::PromptTemplate;
pub use terminology::TerminologyCorrector;

/// Text-generation service failures; every variant is retried at batch level
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limited by text-generation service")]
    RateLimited,

    #[error("Service returned an empty completion")]
    EmptyResponse,

    #[error("Failed to decode service response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ServiceError::Decode(error.to_string())
        } else {
            ServiceError::Transport(error.to_string())
        }
    }
}
