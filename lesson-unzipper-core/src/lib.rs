#![doc = "lesson-unzipper-core: core logic library for lesson-unzipper."]

//! This crate contains the whole lesson pipeline: reading a zipped lesson
//! bundle, patching its runtime script and republishing every file, plus the
//! collaborator traits the deployment crate implements for S3 and Rollbar.
//!
//! # Usage
//! Call [`pipeline::handle_notification`] with concrete collaborators and the
//! raw event payload.

pub mod archive;
pub mod contract;
pub mod error;
pub mod notification;
pub mod patch;
pub mod pipeline;
pub mod publish;

pub use error::{PipelineError, Stage};
