//! The weather collection pipeline.
//!
//! - [`cleaner`] validates and normalizes raw observations
//! - [`pipeline`] runs fetch, persist raw, clean, persist cleaned
//! - [`scheduler`] repeats the pipeline on a fixed interval

pub mod cleaner;
pub mod pipeline;
pub mod scheduler;

pub use cleaner::{QualityReport, Rejection};
pub use pipeline::{Pipeline, PipelineReport, SkipReason};
pub use scheduler::{Scheduler, SchedulerHandle};
