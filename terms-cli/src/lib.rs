//! terms-cli library
//!
//! Everything the `terms` binary does besides argument parsing and process
//! setup: prompts, the batch write workflow, batch creation and dumps, and
//! the list-file tooling.

pub mod batch_file;
pub mod create;
pub mod lists;
pub mod logging;
pub mod prompt;
pub mod workflow;

pub use prompt::{AssumeYes, Prompter, ScriptedPrompter, StdinPrompter};
pub use workflow::{Outcome, WorkflowOptions, WriteMode};
