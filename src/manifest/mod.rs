//! Optional question manifests shipped inside template packages.
//!
//! A template may carry `index.json` (declarative) or `index.rhai`
//! (scripted) next to its `boilerplate/` directory. A manifest that is
//! missing yields no questions; one that fails to load is reported as a
//! warning and also yields no questions, so a broken template never aborts
//! the run on its own.

mod rhai_runtime;

use std::path::Path;

use console::style;
use serde_json::Value;

use crate::config::QuestionSet;

/// Declarative manifest entry point.
pub const JSON_MANIFEST: &str = "index.json";
/// Scripted manifest entry point.
pub const SCRIPT_MANIFEST: &str = "index.rhai";

/// Variable names that hold the project's human-readable name.
pub const PROJECT_NAME_KEYS: &[&str] = &["projectName", "project_name", "name"];

/// What a manifest evaluated to, before it is turned into questions.
pub enum RawManifest {
    Mapping(Value),
    Factory(Box<dyn FnOnce() -> Result<Value, String>>),
}

impl RawManifest {
    /// Invoke a factory if needed and shape the result into questions.
    pub fn resolve(self) -> Result<QuestionSet, String> {
        let value = match self {
            RawManifest::Mapping(value) => value,
            RawManifest::Factory(factory) => factory()?,
        };
        QuestionSet::from_json(value)
    }
}

/// Outcome of looking for a manifest in a template root.
#[derive(Debug, PartialEq)]
pub enum ManifestLoad {
    Absent,
    Malformed { path: String, reason: String },
    Loaded(QuestionSet),
}

impl ManifestLoad {
    /// Collapse into a question set, warning about a malformed manifest.
    pub fn into_questions(self) -> QuestionSet {
        match self {
            ManifestLoad::Absent => QuestionSet::default(),
            ManifestLoad::Malformed { path, reason } => {
                eprintln!(
                    "{} failed to load template manifest {}: {}",
                    style("warning:").yellow().bold(),
                    path,
                    style(reason).yellow()
                );
                eprintln!("  continuing with default values");
                QuestionSet::default()
            }
            ManifestLoad::Loaded(questions) => questions,
        }
    }
}

/// Look for a manifest in `template_root` and evaluate it.
pub fn load_manifest(template_root: &Path, directory_name: &str) -> ManifestLoad {
    let json_path = template_root.join(JSON_MANIFEST);
    if json_path.is_file() {
        return finish(&json_path, read(&json_path).and_then(|s| parse_json(&s)));
    }

    let script_path = template_root.join(SCRIPT_MANIFEST);
    if script_path.is_file() {
        let raw = read(&script_path).and_then(|s| rhai_runtime::evaluate(&s, directory_name));
        return finish(&script_path, raw);
    }

    ManifestLoad::Absent
}

/// Load the manifest, downgrade failures, and prefill the project name.
pub fn load_questions(template_root: &Path, directory_name: &str) -> QuestionSet {
    let mut questions = load_manifest(template_root, directory_name).into_questions();
    inject_project_name(&mut questions, directory_name);
    questions
}

/// Give project-name questions without an initial value the directory name.
pub fn inject_project_name(questions: &mut QuestionSet, directory_name: &str) {
    for question in questions.iter_mut() {
        if question.initial.is_none() && PROJECT_NAME_KEYS.contains(&question.name.as_str()) {
            question.initial = Some(Value::String(directory_name.to_string()));
        }
    }
}

fn finish(path: &Path, raw: Result<RawManifest, String>) -> ManifestLoad {
    match raw.and_then(RawManifest::resolve) {
        Ok(questions) => ManifestLoad::Loaded(questions),
        Err(reason) => ManifestLoad::Malformed {
            path: path.display().to_string(),
            reason,
        },
    }
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| e.to_string())
}

fn parse_json(content: &str) -> Result<RawManifest, String> {
    serde_json::from_str(content)
        .map(RawManifest::Mapping)
        .map_err(|e| e.to_string())
}
