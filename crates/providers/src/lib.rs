//! LLM Provider implementations for SkyWatch.
//!
//! All providers implement the `skywatch_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
