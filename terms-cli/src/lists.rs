//! Terms/titles list-file tooling
//!
//! A terms file and a titles file each hold one item per line. These
//! commands line them up, check their lengths and convert them into the
//! comma-delimited lists `terms create` takes.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::io::ErrorKind;
use std::path::Path;

/// Both list files, loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPair {
    pub terms: Vec<String>,
    pub titles: Vec<String>,
}

/// Result of comparing the two lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCheck {
    Match(usize),
    /// The terms file has this many fewer items
    TermsShort(usize),
    /// The titles file has this many fewer items
    TitlesShort(usize),
}

fn read_lines(path: &Path, which: &str) -> Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(anyhow!(
            "The {} file does not exist: {}",
            which,
            path.display()
        )),
        Err(e) => Err(e).with_context(|| format!("Failed to read the {} file: {}", which, path.display())),
    }
}

impl ListPair {
    pub fn load(terms_path: &Path, titles_path: &Path) -> Result<Self> {
        Ok(Self {
            terms: read_lines(terms_path, "terms")?,
            titles: read_lines(titles_path, "titles")?,
        })
    }

    pub fn check(&self) -> ListCheck {
        let (terms, titles) = (self.terms.len(), self.titles.len());
        if terms < titles {
            ListCheck::TermsShort(titles - terms)
        } else if titles < terms {
            ListCheck::TitlesShort(terms - titles)
        } else {
            ListCheck::Match(terms)
        }
    }

    /// Term/title rows, padded with `None` on the shorter side
    pub fn rows(&self) -> Vec<(Option<&str>, Option<&str>)> {
        let len = self.terms.len().max(self.titles.len());
        (0..len)
            .map(|i| {
                (
                    self.terms.get(i).map(String::as_str),
                    self.titles.get(i).map(String::as_str),
                )
            })
            .collect()
    }

    /// Comma-delimited terms and titles; fails unless the lengths match
    pub fn convert(&self) -> Result<(String, String)> {
        match self.check() {
            ListCheck::Match(_) => Ok((self.terms.join(","), self.titles.join(","))),
            _ => Err(anyhow!(
                "Cannot convert. Titles and terms files are NOT of equal length."
            )),
        }
    }
}

/// Print terms and titles side by side; returns the exit code
pub fn show(pair: &ListPair) -> i32 {
    println!(
        "Creating a visual combination of {} terms and {} titles from the terms and titles files...",
        pair.terms.len(),
        pair.titles.len()
    );
    match pair.check() {
        ListCheck::TitlesShort(_) => println!("{}", "WARNING: There are more terms than titles!".yellow()),
        ListCheck::TermsShort(_) => println!("{}", "WARNING: There are more titles than terms!".yellow()),
        ListCheck::Match(_) => {}
    }
    println!();

    for (term, title) in pair.rows() {
        match term.filter(|t| !t.is_empty()) {
            Some(term) => println!("{}", format!("Term: {}", term).blue()),
            None => println!("{}", format!("Term: {}", term.unwrap_or_default()).red()),
        }
        match title.filter(|t| !t.is_empty()) {
            Some(title) => println!("{}", format!("Title: {}", title).green()),
            None => println!("{}", format!("Title: {}", title.unwrap_or_default()).red()),
        }
        println!();
    }
    0
}

/// Report whether both files have the same item count; returns the exit code
pub fn check(pair: &ListPair) -> i32 {
    let (short, long, n) = match pair.check() {
        ListCheck::Match(n) => {
            println!(
                "{}",
                format!("SUCCESS: The terms and titles files each had the same number of items: {}", n).green()
            );
            println!(
                "{}",
                "The terms and titles files are safe to convert to comma delimited lists.".green()
            );
            return 0;
        }
        ListCheck::TermsShort(n) => ("terms", "titles", n),
        ListCheck::TitlesShort(n) => ("titles", "terms", n),
    };

    eprintln!(
        "{}",
        format!(
            "--> Mismatch: The {} file had {} items less than the {} file. <--",
            short, n, long
        )
        .red()
    );
    eprintln!(
        "{}",
        "The terms and titles files are NOT safe to convert to comma delimited lists.".yellow()
    );
    1
}

/// Print both files as comma-delimited lists; returns the exit code
pub fn convert(pair: &ListPair) -> i32 {
    match pair.convert() {
        Ok((terms, titles)) => {
            println!("{} {}", "Terms:".blue(), terms);
            println!();
            println!("{} {}", "Titles:".green(), titles);
            0
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            eprintln!("{}", "Run the 'lists check' command for more details.".yellow());
            1
        }
    }
}
