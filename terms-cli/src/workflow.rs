//! Batch write workflow
//!
//! Drives one batch from raw input to a terminal [`Outcome`]:
//!
//! ```text
//! validate shape/type -> uniqueness -> mode
//!   seed            -> create-only write
//!   seed --force    -> confirm overwrite -> overwrite write
//!   append          -> conflict check -> (report? strip?) -> union append
//!   check           -> conflict report, no write
//! ```
//!
//! There is no retry loop. The store is closed before every return.

use crate::prompt::Prompter;
use serde_json::Value;
use terms_common::reconcile::{conflict_report, strip_conflicts};
use terms_common::validation::{check_uniqueness, parse_batch};
use terms_common::{DocumentStore, SeedMode, TermRecord, TermsLogger, TermsRepository};
use tracing::{debug, error, info};

pub const OVERWRITE_PROMPT: &str = "WARNING: This seeding operation could potentially overwrite an entire terms \
document in the database. Thousands of search terms could be lost, are you sure you want to proceed (y/n)?";

pub const REPORT_PROMPT: &str =
    "Would you like an error report of the problematic local data (y/n)?";

pub const STRIP_PROMPT: &str =
    "Proceed with removing the problematic local data before appending it to the database (y/n)?";

/// What to do with a validated batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create-only seed
    Seed,
    /// Destructive seed, behind a confirmation
    OverwriteSeed,
    /// Conflict-checked union append
    Append,
    /// Validate and report conflicts without writing
    Check,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowOptions {
    /// Verbose validation diagnostics
    pub debug: bool,
    /// Stop before any write
    pub dry_run: bool,
}

/// Terminal state of a workflow run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Write (or dry run / check) finished
    Done(String),
    /// User declined a confirmation
    Declined(String),
    /// Every record was stripped as conflicting
    NothingLeft,
    /// Batch failed validation
    Invalid(String),
    /// `check` found conflicts with stored data
    Conflicts(usize),
    /// Store or prompt failure
    Failed(String),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Done(_) | Outcome::Declined(_) => 0,
            Outcome::NothingLeft
            | Outcome::Invalid(_)
            | Outcome::Conflicts(_)
            | Outcome::Failed(_) => 1,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Done(msg) | Outcome::Declined(msg) => msg.clone(),
            Outcome::NothingLeft => "After removing problematic data there was no data left to append. \
                                     Program aborted."
                .to_string(),
            Outcome::Invalid(msg) => format!("Invalid terms data: {}", msg),
            Outcome::Conflicts(n) => format!(
                "{} conflict(s) with stored terms. The data is NOT safe to append.",
                n
            ),
            Outcome::Failed(msg) => msg.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }
}

/// Validate raw JSON records and run them through the workflow
pub async fn run_raw<S: DocumentStore>(
    repo: &TermsRepository<S>,
    raw: &[Value],
    mode: WriteMode,
    prompter: &mut dyn Prompter,
    console: &dyn TermsLogger,
    options: WorkflowOptions,
) -> Outcome {
    match parse_batch(raw, options.debug, console) {
        Ok(records) => run_records(repo, &records, mode, prompter, console, options).await,
        Err(e) => {
            repo.close().await;
            Outcome::Invalid(e.to_string())
        }
    }
}

/// Run already-typed records through the workflow
pub async fn run_records<S: DocumentStore>(
    repo: &TermsRepository<S>,
    records: &[TermRecord],
    mode: WriteMode,
    prompter: &mut dyn Prompter,
    console: &dyn TermsLogger,
    options: WorkflowOptions,
) -> Outcome {
    let outcome = match check_uniqueness(records, console) {
        Ok(()) => dispatch(repo, records, mode, prompter, console, options).await,
        Err(e) => Outcome::Invalid(e.to_string()),
    };

    debug!("Workflow finished: {:?}", outcome);
    repo.close().await;
    outcome
}

async fn dispatch<S: DocumentStore>(
    repo: &TermsRepository<S>,
    records: &[TermRecord],
    mode: WriteMode,
    prompter: &mut dyn Prompter,
    console: &dyn TermsLogger,
    options: WorkflowOptions,
) -> Outcome {
    match mode {
        WriteMode::Seed => write_seed(repo, records, false, options).await,
        WriteMode::OverwriteSeed => match prompter.confirm(OVERWRITE_PROMPT) {
            Ok(true) => write_seed(repo, records, true, options).await,
            Ok(false) => Outcome::Declined("Aborted seeding operation.".to_string()),
            Err(e) => Outcome::Failed(format!("{:#}", e)),
        },
        WriteMode::Append => append_flow(repo, records, prompter, console, options).await,
        WriteMode::Check => match repo.exists_in_db(records, None).await {
            Ok(None) => {
                conflict_report(records, &[], console);
                Outcome::Done(format!("{} term object(s) passed every check.", records.len()))
            }
            Ok(Some(conflicts)) => {
                conflict_report(records, &conflicts, console);
                Outcome::Conflicts(conflicts.len())
            }
            Err(e) => Outcome::Failed(e.to_string()),
        },
    }
}

async fn write_seed<S: DocumentStore>(
    repo: &TermsRepository<S>,
    records: &[TermRecord],
    overwrite: bool,
    options: WorkflowOptions,
) -> Outcome {
    if options.dry_run {
        return Outcome::Done(format!(
            "Dry run: {} term object(s) would be seeded into the '{}' collection.",
            records.len(),
            repo.collection()
        ));
    }

    match repo.seed_with(records, SeedMode::from_force(overwrite)).await {
        Ok(msg) => Outcome::Done(msg),
        Err(e) => {
            error!("Seed failed: {}", e);
            Outcome::Failed(e.to_string())
        }
    }
}

async fn append_flow<S: DocumentStore>(
    repo: &TermsRepository<S>,
    records: &[TermRecord],
    prompter: &mut dyn Prompter,
    console: &dyn TermsLogger,
    options: WorkflowOptions,
) -> Outcome {
    let conflicts = match repo.exists_in_db(records, None).await {
        Ok(conflicts) => conflicts,
        Err(e) => return Outcome::Failed(e.to_string()),
    };

    let to_append = match conflicts {
        None => {
            conflict_report(records, &[], console);
            records.to_vec()
        }
        Some(conflicts) => {
            info!("{} conflict(s) found against stored terms", conflicts.len());
            match prompter.confirm(REPORT_PROMPT) {
                Ok(true) => conflict_report(records, &conflicts, console),
                Ok(false) => {}
                Err(e) => return Outcome::Failed(format!("{:#}", e)),
            }
            match prompter.confirm(STRIP_PROMPT) {
                Ok(true) => {}
                Ok(false) => {
                    return Outcome::Declined("No data was appended. Program aborted.".to_string())
                }
                Err(e) => return Outcome::Failed(format!("{:#}", e)),
            }

            let remaining = strip_conflicts(records, &conflicts);
            if remaining.is_empty() {
                return Outcome::NothingLeft;
            }
            console.log("Problematic data was removed.");
            remaining
        }
    };

    if options.dry_run {
        return Outcome::Done(format!(
            "Dry run: {} term object(s) would be appended to the '{}' collection.",
            to_append.len(),
            repo.collection()
        ));
    }

    match repo.append(&to_append).await {
        Ok(msg) => Outcome::Done(msg),
        Err(e) => {
            error!("Append failed: {}", e);
            Outcome::Failed(e.to_string())
        }
    }
}
