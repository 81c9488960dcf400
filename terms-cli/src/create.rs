//! Term batch creation from comma-delimited lists
//!
//! Rules for both lists:
//! 1. Terms and titles must be comma-delimited lists of equal length.
//! 2. A list cannot end with a trailing comma.
//! 3. A list cannot contain duplicate values.

use crate::prompt::{is_quit, Prompter};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Timelike, Utc};
use colored::Colorize;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use terms_common::TermRecord;
use tracing::info;

/// Numbered type choices offered at the prompt
pub const TYPE_CHOICES: [(&str, &str); 2] = [("1", "front end"), ("2", "back end")];

/// Map a prompt choice (`1`, `2`) to its type
pub fn type_from_choice(choice: &str) -> Option<&'static str> {
    TYPE_CHOICES
        .iter()
        .find(|(key, _)| *key == choice.trim())
        .map(|(_, record_type)| *record_type)
}

/// Split a comma-delimited list, enforcing the list rules
pub fn parse_list(input: &str, what: &str) -> Result<Vec<String>> {
    let input = input.trim();
    if input.is_empty() {
        bail!("the {} list is empty", what);
    }
    if input.ends_with(',') {
        bail!("the {} list cannot end with a trailing comma", what);
    }

    let items: Vec<String> = input.split(',').map(|s| s.trim().to_string()).collect();
    if items.iter().any(String::is_empty) {
        bail!("the {} list contains an empty item", what);
    }

    let mut seen = HashSet::new();
    if let Some(dup) = items.iter().find(|item| !seen.insert(item.as_str())) {
        bail!("the {} list contains the duplicate value '{}'", what, dup);
    }

    Ok(items)
}

pub fn lengths_mismatch_message(terms: usize, titles: usize) -> String {
    format!(
        "Error: the number of terms and their corresponding titles must match exactly. \
         Terms length: {}. Titles length: {}",
        terms, titles
    )
}

/// Pair terms with titles, giving each record a fresh UUID
pub fn build_records(record_type: &str, terms: &[String], titles: &[String]) -> Result<Vec<TermRecord>> {
    if terms.len() != titles.len() {
        bail!(lengths_mismatch_message(terms.len(), titles.len()));
    }
    Ok(terms
        .iter()
        .zip(titles)
        .map(|(term, title)| TermRecord::generate(record_type, term.as_str(), title.as_str()))
        .collect())
}

/// `terms_HH.MM.SS.ss.json` (UTC, centisecond precision)
pub fn dump_file_name(now: DateTime<Utc>) -> String {
    format!(
        "terms_{}.{:02}.json",
        now.format("%H.%M.%S"),
        now.nanosecond() % 1_000_000_000 / 10_000_000
    )
}

#[derive(Serialize)]
struct Dump<'a> {
    terms: &'a [TermRecord],
}

/// Write `{"terms": [...]}` into `dir`, creating it if needed
pub fn write_dump(dir: &Path, records: &[TermRecord], now: DateTime<Utc>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create dump directory: {}", dir.display()))?;
    let path = dir.join(dump_file_name(now));
    let json = serde_json::to_string_pretty(&Dump { terms: records })?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write dump: {}", path.display()))?;
    info!("Dumped {} record(s) to {}", records.len(), path.display());
    Ok(path)
}

/// Values given on the command line; anything missing is prompted for
#[derive(Debug, Clone, Default)]
pub struct CreateInput {
    pub record_type: Option<String>,
    pub terms: Option<String>,
    pub titles: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collected {
    Records(Vec<TermRecord>),
    Quit,
}

/// Gather type, terms and titles, then build the batch
///
/// Flag values are validated once; prompted values are asked again until
/// they follow the rules. Answering `q` to any prompt quits.
pub fn collect_batch(input: &CreateInput, prompter: &mut dyn Prompter) -> Result<Collected> {
    let record_type = match &input.record_type {
        Some(given) => type_from_choice(given)
            .map(str::to_string)
            .unwrap_or_else(|| given.trim().to_string()),
        None => loop {
            let answer = prompter.ask(
                "Choose a type for the terms: enter 1 for 'front end', or 2 for 'back end'",
            )?;
            if is_quit(&answer) {
                return Ok(Collected::Quit);
            }
            match type_from_choice(&answer) {
                Some(record_type) => break record_type.to_string(),
                None => eprintln!("{}", "Only the values 1 or 2 are allowed here.".red()),
            }
        },
    };
    if terms_common::snake_case(&record_type).is_empty() {
        bail!("'{}' is not a usable type", record_type);
    }

    let Some(terms) = list_value(input.terms.as_deref(), "terms", prompter)? else {
        return Ok(Collected::Quit);
    };
    let Some(titles) = list_value(input.titles.as_deref(), "titles", prompter)? else {
        return Ok(Collected::Quit);
    };

    Ok(Collected::Records(build_records(&record_type, &terms, &titles)?))
}

fn list_value(given: Option<&str>, what: &str, prompter: &mut dyn Prompter) -> Result<Option<Vec<String>>> {
    if let Some(given) = given {
        return parse_list(given, what).map(Some);
    }

    let question = match what {
        "titles" => "Enter a comma delimited list of corresponding titles".to_string(),
        _ => format!("Enter a comma delimited list of {}", what),
    };
    loop {
        let answer = prompter.ask(&question)?;
        if is_quit(&answer) {
            return Ok(None);
        }
        match parse_list(&answer, what) {
            Ok(items) => return Ok(Some(items)),
            Err(e) => eprintln!("{} {}", "You broke one of the rules! Try again:".red(), e),
        }
    }
}
