//! Scenario resolution and age-stratified parameter editing for epidemic
//! model runs.
//!
//! A run is described by a scenario file, two age-stratified distributions
//! (severity and age structure) and a handful of command line overrides. This
//! crate merges those layers into a single flat parameter set, keeps the
//! per-age-group table editable, and hands the result to a [`ModelRunner`].
pub mod config;
pub mod data;
pub mod editor;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod runner;
pub mod scenario;

pub use crate::error::{DecodeError, Error, Result};
pub use crate::prelude::*;
pub use crate::runner::{ModelRunner, RunResult, SeirRunner};
