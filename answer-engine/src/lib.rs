//! Question answering over uploaded data.
//!
//! Public API: [`Resolver::resolve`]. A direct answer found in uploaded
//! tables is returned as-is; otherwise a compact prompt (question + bounded
//! file summary) is sent to the configured model and the first line of its
//! reply is returned.

mod error;
mod llm;
pub mod prompt;
mod resolver;

pub use error::AnswerError;
pub use llm::CompletionClient;
pub use resolver::{NOT_CONFIGURED, Resolver, ResolverConfig, clean_answer, direct_answer};
