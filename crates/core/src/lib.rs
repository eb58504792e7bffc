//! # SkyWatch Core
//!
//! Domain types, traits, and error definitions for the SkyWatch weather
//! agent. Nothing in here talks to the network or a database: it defines
//! the model every other crate implements against.
//!
//! ## Layout
//!
//! - [`observation`]: raw and cleaned weather records
//! - [`weather`]: the [`WeatherSource`] trait (live provider access)
//! - [`store`]: the [`WeatherStore`] trait (append-only persistence)
//! - [`message`], [`provider`], [`tool`]: the conversational tool-calling model
//! - [`event`]: domain events shared by the pipeline and the agent loop

pub mod error;
pub mod event;
pub mod message;
pub mod observation;
pub mod provider;
pub mod store;
pub mod tool;
pub mod weather;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use observation::{CleanedRecord, Observation, StoredRecord, TemperatureStats};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use store::WeatherStore;
pub use tool::{FallbackHint, Tool, ToolCall, ToolRegistry, ToolResult};
pub use weather::WeatherSource;
