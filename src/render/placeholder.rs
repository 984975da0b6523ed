use std::borrow::Cow;
use std::sync::OnceLock;

use regex_lite::{Captures, Regex};
use serde_json::Value;

use crate::prompt::Locals;

/// `{{ key }}`, optionally preceded by a `\` escape.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\\)?\{\{\s*([^{}]*?)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Replace every `{{ key }}` found in `locals`.
///
/// Unknown keys are left as written. An escaped `\{{ key }}` loses its
/// backslash and is never substituted.
pub fn substitute<'a>(text: &'a str, locals: &Locals) -> Cow<'a, str> {
    placeholder_re().replace_all(text, |caps: &Captures| {
        let whole = &caps[0];
        if caps.get(1).is_some() {
            return whole[1..].to_string();
        }
        match locals.get(&caps[2]) {
            Some(value) => render_value(value),
            None => whole.to_string(),
        }
    })
}

/// Strings are inserted verbatim, everything else as JSON text.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
