//! Answer sources for the `ask` policy.
//!
//! The resolver never touches the console directly; unattended callers plug
//! in [`NonInteractivePrompt`] or a [`ScriptedPrompt`] instead.
use super::types::{FieldKind, MissingField};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Supplies one line of text per missing field.
pub trait PromptProvider {
    fn ask(&mut self, field: &MissingField) -> io::Result<String>;
}

/// Question line shown to the operator, including enum options.
pub fn render_question(field: &MissingField) -> String {
    let mut text = format!("{} [{}]", field.question, field.hint);
    if field.kind == FieldKind::Enum {
        if let Some(options) = field.options.as_ref().filter(|options| !options.is_empty()) {
            text.push_str(&format!(" Opciones: {}", options.join(", ")));
        }
    }
    text
}

/// Prompts on stderr and reads the answer from stdin.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl PromptProvider for ConsolePrompt {
    fn ask(&mut self, field: &MissingField) -> io::Result<String> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{}\n> ", render_question(field))?;
        stderr.flush()?;
        let mut line = String::new();
        // EOF reads as an empty answer
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Always answers empty, so only fields with defaults can be resolved.
#[derive(Debug, Default)]
pub struct NonInteractivePrompt;

impl PromptProvider for NonInteractivePrompt {
    fn ask(&mut self, _field: &MissingField) -> io::Result<String> {
        Ok(String::new())
    }
}

/// Answers from a fixed queue, then empty. Records which paths were asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
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

    /// Load answers from a text file, one per line. Blank lines are empty
    /// answers.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::new(text.lines()))
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl PromptProvider for ScriptedPrompt {
    fn ask(&mut self, field: &MissingField) -> io::Result<String> {
        self.asked.push(field.path.clone());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
