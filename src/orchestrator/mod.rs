//! Application-level orchestration.
//!
//! This module owns the submission lifecycle (identity fetch, form POST,
//! result caching, render sequencing) and post-submission processing such as
//! CSV export. UI/CLI layers drive it through commands and consume its
//! events to keep responsibilities separated.

mod controller;
mod post_process;

pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use post_process::{default_csv_name, export_csv};
