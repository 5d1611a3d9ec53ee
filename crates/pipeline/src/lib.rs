//! The vademecum answer pipeline.
//!
//! Implements the retrieval-and-refusal contract as a chain of small,
//! individually testable stages:
//!
//! 1. **Context assembly** — select a bounded subset of stored entries
//!    relevant to the query ([`context`], [`similarity`])
//! 2. **Prompt building** — combine system instruction, context, and query
//!    into one instruct-formatted string ([`prompt`])
//! 3. **Generation** — one bounded call to the injected `Generator`
//! 4. **Guarding** — validate the raw output into `Answered` or `Refused`
//!    ([`guard`])
//!
//! [`chat::ChatPipeline`] wires the stages together and is the only entry
//! point the HTTP gateway and CLI use.
//!
//! # Determinism
//!
//! Retrieval is deterministic: identical knowledge base and query always
//! produce an identical context window. No random or time-dependent logic
//! is used during assembly.

pub mod chat;
pub mod context;
pub mod guard;
pub mod prompt;
pub mod similarity;

pub use chat::ChatPipeline;
pub use context::{ContextAssembler, SelectionPolicy, CONTEXT_SEPARATOR};
pub use prompt::{build_prompt, SYSTEM_PROMPT};
