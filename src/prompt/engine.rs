use std::collections::HashMap;

use console::style;
use inquire::InquireError;
use serde_json::{Map, Value};

use crate::config::{Choice, Question, QuestionKind, QuestionSet};
use crate::error::{Result, SproutError};
use crate::registry::SearchEntry;
use crate::target::Disposition;

/// Answers keyed by variable name, in question order.
pub type Locals = Map<String, Value>;

#[derive(Default)]
pub struct PromptOptions {
    pub data_overrides: HashMap<String, String>,
    pub use_defaults: bool,
}

/// The interactive surface the pipeline talks to.
///
/// Every method returns `SproutError::PromptCancelled` when the user
/// backs out.
pub trait Prompter {
    fn target_dir(&mut self, default: &str) -> Result<String>;
    fn select_template(&mut self, candidates: &[SearchEntry]) -> Result<SearchEntry>;
    fn overwrite(&mut self, message: &str) -> Result<Disposition>;
    fn ask(&mut self, question: &Question) -> Result<Value>;
}

/// Ask every question in order and collect the answers.
///
/// Overrides skip the prompt; with `use_defaults`, questions that declare an
/// initial value take it without prompting.
pub fn collect_locals(
    questions: &QuestionSet,
    prompter: &mut dyn Prompter,
    options: &PromptOptions,
) -> Result<Locals> {
    let mut locals = Locals::new();

    for question in questions.iter() {
        if let Some(raw) = options.data_overrides.get(&question.name) {
            locals.insert(question.name.clone(), parse_override(raw, question));
            continue;
        }

        if options.use_defaults {
            if let Some(initial) = &question.initial {
                locals.insert(question.name.clone(), initial.clone());
                continue;
            }
        }

        let answer = prompter.ask(question)?;
        locals.insert(question.name.clone(), answer);
    }

    Ok(locals)
}

fn parse_override(value: &str, question: &Question) -> Value {
    match question.kind {
        QuestionKind::Confirm | QuestionKind::Toggle => {
            Value::Bool(value == "true" || value == "1" || value == "yes")
        }
        QuestionKind::Number => value
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .ok()
            .or_else(|| {
                value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
            })
            .unwrap_or_else(|| Value::String(value.to_string())),
        QuestionKind::Multiselect | QuestionKind::List => {
            let separator = question.separator.as_deref().unwrap_or(",");
            split_list(value, separator)
        }
        _ => Value::String(value.to_string()),
    }
}

fn split_list(value: &str, separator: &str) -> Value {
    Value::Array(
        value
            .split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
    )
}

fn cancelled(e: InquireError) -> SproutError {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            SproutError::PromptCancelled
        }
        InquireError::IO(source) => SproutError::Io {
            context: "reading terminal input".into(),
            source,
        },
        other => SproutError::Prompt {
            reason: other.to_string(),
        },
    }
}

/// Terminal prompts backed by `inquire`.
#[derive(Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn target_dir(&mut self, default: &str) -> Result<String> {
        inquire::Text::new("Project name:")
            .with_default(default)
            .prompt()
            .map_err(cancelled)
    }

    fn select_template(&mut self, candidates: &[SearchEntry]) -> Result<SearchEntry> {
        inquire::Select::new("Select a template:", candidates.to_vec())
            .with_page_size(10)
            .prompt()
            .map_err(cancelled)
    }

    fn overwrite(&mut self, message: &str) -> Result<Disposition> {
        inquire::Select::new(message, Disposition::ALL.to_vec())
            .prompt()
            .map_err(cancelled)
    }

    fn ask(&mut self, question: &Question) -> Result<Value> {
        let message = question.message();

        match question.kind {
            QuestionKind::Text | QuestionKind::Unsupported => {
                if question.kind == QuestionKind::Unsupported {
                    eprintln!(
                        "{} unsupported question type for '{}', asking as text",
                        style("warning:").yellow().bold(),
                        question.name
                    );
                }
                let default = initial_text(question);
                let mut prompt = inquire::Text::new(message);
                if let Some(default) = &default {
                    prompt = prompt.with_default(default);
                }
                let answer = prompt.prompt().map_err(cancelled)?;
                Ok(Value::String(answer))
            }
            QuestionKind::Password | QuestionKind::Invisible => {
                let prompt = inquire::Password::new(message)
                    .without_confirmation()
                    .with_display_mode(password_display_mode(&question.kind));
                let answer = prompt.prompt().map_err(cancelled)?;
                Ok(Value::String(answer))
            }
            QuestionKind::Number => {
                let default = initial_text(question);
                let mut prompt = inquire::Text::new(message);
                if let Some(default) = &default {
                    prompt = prompt.with_default(default);
                }
                prompt = prompt.with_validator(|input: &str| match input.parse::<f64>() {
                    Ok(f) if f.is_finite() => Ok(inquire::validator::Validation::Valid),
                    _ => Ok(inquire::validator::Validation::Invalid(
                        inquire::validator::ErrorMessage::Custom("Must be a finite number".to_string()),
                    )),
                });
                let answer = prompt.prompt().map_err(cancelled)?;
                Ok(parse_override(&answer, question))
            }
            QuestionKind::Confirm | QuestionKind::Toggle => {
                let default = matches!(question.initial, Some(Value::Bool(true)));
                let answer = inquire::Confirm::new(message)
                    .with_default(default)
                    .prompt()
                    .map_err(cancelled)?;
                Ok(Value::Bool(answer))
            }
            QuestionKind::Select => {
                let choices = question.choices.clone().unwrap_or_default();
                if choices.is_empty() {
                    return Ok(question.initial.clone().unwrap_or(Value::Null));
                }
                let titles: Vec<String> = choices.iter().map(|c| c.title().to_string()).collect();
                let mut prompt = inquire::Select::new(message, titles);
                if let Some(idx) = initial_index(question, &choices) {
                    prompt = prompt.with_starting_cursor(idx);
                }
                let picked = prompt.raw_prompt().map_err(cancelled)?;
                Ok(choices[picked.index].value())
            }
            QuestionKind::Multiselect => {
                let choices = question.choices.clone().unwrap_or_default();
                let titles: Vec<String> = choices.iter().map(|c| c.title().to_string()).collect();
                let defaults = initial_indices(question, &choices);
                let mut prompt = inquire::MultiSelect::new(message, titles);
                if !defaults.is_empty() {
                    prompt = prompt.with_default(&defaults);
                }
                let picked = prompt.raw_prompt().map_err(cancelled)?;
                Ok(Value::Array(
                    picked.into_iter().map(|p| choices[p.index].value()).collect(),
                ))
            }
            QuestionKind::List => {
                let default = initial_text(question);
                let mut prompt = inquire::Text::new(message);
                if let Some(default) = &default {
                    prompt = prompt.with_default(default);
                }
                let answer = prompt.prompt().map_err(cancelled)?;
                let separator = question.separator.as_deref().unwrap_or(",");
                Ok(split_list(&answer, separator))
            }
        }
    }
}

/// `password` echoes a mask character per keystroke, `invisible` echoes nothing.
fn password_display_mode(kind: &QuestionKind) -> inquire::PasswordDisplayMode {
    if *kind == QuestionKind::Invisible {
        inquire::PasswordDisplayMode::Hidden
    } else {
        inquire::PasswordDisplayMode::Masked
    }
}

fn initial_text(question: &Question) -> Option<String> {
    match &question.initial {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// `initial` for a select is either an index or one of the choice values.
fn initial_index(question: &Question, choices: &[Choice]) -> Option<usize> {
    match question.initial.as_ref()? {
        Value::Number(n) => n.as_u64().map(|i| i as usize).filter(|i| *i < choices.len()),
        value => choices.iter().position(|c| &c.value() == value),
    }
}

fn initial_indices(question: &Question, choices: &[Choice]) -> Vec<usize> {
    match &question.initial {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Number(n) => n.as_u64().map(|i| i as usize).filter(|i| *i < choices.len()),
                value => choices.iter().position(|c| &c.value() == value),
            })
            .collect(),
        _ => Vec::new(),
    }
}
