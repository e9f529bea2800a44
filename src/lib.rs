//! A runtime metrics reporting agent.
//!
//! The agent samples memory statistics of its own process on one interval,
//! queues the resulting records in a bounded buffer, and posts them as JSON
//! to a collector's `/update/` endpoint on another interval.

pub mod agent;
pub mod common;
pub mod config;
mod error;
pub mod metrics;

pub use agent::sampler::alloc::CountingAllocator;
pub use agent::shutdown::{channel as shutdown_channel, Shutdown, Trigger};
pub use agent::Agent;
pub use config::Config;
pub use error::Error;
pub use metrics::{MetricKind, MetricRecord};
