//! The SkyWatch query loop.
//!
//! Each question runs through a short cycle:
//!
//! 1. **Seed** a conversation with the fixed weather-only instruction and
//!    the user's question
//! 2. **Send** it with the tool catalog to the language model
//! 3. **If tool calls**: dispatch them, append the results, go back to 2
//! 4. **If text**: return it
//!
//! The number of tool-requesting turns is bounded, and a provider failure
//! ends the query with a single apology.

pub mod dispatch;
pub mod loop_runner;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dispatch::Dispatcher;
pub use loop_runner::AgentLoop;
