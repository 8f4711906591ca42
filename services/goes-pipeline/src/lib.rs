//! GOES pipeline library.
//!
//! Composes the fetcher, scene preparer and renderer for the
//! `goes-pipeline` binary.

pub mod config;
pub mod pipeline;

pub use config::PipelineJob;
pub use pipeline::{run_job, RunSummary};
