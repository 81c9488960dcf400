//! Interactive prompts (CLI boundary)
//!
//! The workflow only asks questions through [`Prompter`]; reading stdin is
//! confined to [`StdinPrompter`].

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of answers to the CLI's questions
pub trait Prompter {
    /// Yes/no question, asked again until the answer is `y`/`yes` or `n`/`no`
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Free-form question; the answer is returned trimmed
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Printed before a yes/no question is asked again
pub const YES_NO_HINT: &str = "Please answer y or n.";

/// `Some(true)` for y/yes, `Some(false)` for n/no (any case), `None` otherwise
pub(crate) fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// True when the user typed `q` to leave
pub fn is_quit(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("q")
}

/// Reads answers from stdin, prints questions to stderr
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    pub fn new() -> Self {
        Self
    }

    fn read_answer(&self, question: &str) -> Result<String> {
        eprint!("{} {} ", "?".green().bold(), question);
        io::stderr().flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read answer from stdin")?;
        if read == 0 {
            return Err(anyhow!("stdin closed before an answer was given"));
        }
        Ok(line.trim().to_string())
    }
}

impl Prompter for StdinPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            if let Some(yes) = parse_yes_no(&self.read_answer(question)?) {
                return Ok(yes);
            }
            eprintln!("{}", YES_NO_HINT.yellow());
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        self.read_answer(question)
    }
}

/// Non-interactive: every confirmation is answered yes
///
/// Free-form questions cannot be answered and fail.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        tracing::debug!("Assuming yes: {}", question);
        Ok(true)
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        Err(anyhow!("cannot prompt in non-interactive mode: {}", question))
    }
}

/// Replays canned answers in order and records every question asked
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, question: &str) -> Result<String> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted answer for: {}", question))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            if let Some(yes) = parse_yes_no(&self.next_answer(question)?) {
                return Ok(yes);
            }
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        Ok(self.next_answer(question)?.trim().to_string())
    }
}
