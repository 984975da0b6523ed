use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Interactive prompt kinds a template manifest may ask for.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Password,
    Invisible,
    Number,
    Confirm,
    Toggle,
    Select,
    Multiselect,
    List,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Choice {
    Plain(String),
    Detailed {
        title: String,
        #[serde(default)]
        value: Option<Value>,
    },
}

impl Choice {
    pub fn title(&self) -> &str {
        match self {
            Choice::Plain(s) => s,
            Choice::Detailed { title, .. } => title,
        }
    }

    /// The value recorded when this choice is picked; falls back to the title.
    pub fn value(&self) -> Value {
        match self {
            Choice::Plain(s) => Value::String(s.clone()),
            Choice::Detailed { title, value } => {
                value.clone().unwrap_or_else(|| Value::String(title.clone()))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Question {
    /// Variable name; an empty name is replaced by the manifest key.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub initial: Option<Value>,
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    /// Separator for `list` answers (defaults to `,`).
    #[serde(default)]
    pub separator: Option<String>,
}

impl Question {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(&self.name)
    }
}

/// The ordered questions declared by a template manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Build a question set from manifest JSON.
    ///
    /// Accepts an object keyed by variable (key order is kept), an array of
    /// question objects each carrying a `name`, or `null` for no questions.
    pub fn from_json(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => {
                let mut questions = Vec::with_capacity(map.len());
                for (key, definition) in map {
                    let mut question: Question = serde_json::from_value(definition)
                        .map_err(|e| format!("question '{key}': {e}"))?;
                    if question.name.is_empty() {
                        question.name = key;
                    }
                    questions.push(question);
                }
                Ok(Self { questions })
            }
            Value::Array(items) => {
                let mut questions = Vec::with_capacity(items.len());
                for (idx, definition) in items.into_iter().enumerate() {
                    let question: Question = serde_json::from_value(definition)
                        .map_err(|e| format!("question #{idx}: {e}"))?;
                    if question.name.is_empty() {
                        return Err(format!("question #{idx} has no 'name'"));
                    }
                    questions.push(question);
                }
                Ok(Self { questions })
            }
            other => Err(format!(
                "expected an object or array of questions, found {}",
                json_kind(&other)
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Question> {
        self.questions.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.name == name)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
