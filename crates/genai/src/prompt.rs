//! Fixed instruction templates with `{{{field}}}` placeholders.

use serde_json::{Map, Value};

const OPEN: &str = "{{{";
const CLOSE: &str = "}}}";

#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub text: &'static str,
}

impl PromptTemplate {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self { name, text }
    }

    /// Substitute `input` into the template in a single left-to-right pass.
    ///
    /// Inserted values are never rescanned, so a value containing `{{{x}}}`
    /// comes out verbatim. Placeholders with no matching key render empty.
    pub fn bind(&self, input: &Map<String, Value>) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text;

        while let Some(start) = rest.find(OPEN) {
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                break;
            };

            out.push_str(&rest[..start]);
            let key = after_open[..end].trim();
            match input.get(key) {
                Some(Value::String(text)) => out.push_str(text),
                Some(Value::Null) | None => {}
                Some(other) => out.push_str(&other.to_string()),
            }
            rest = &after_open[end + CLOSE.len()..];
        }

        out.push_str(rest);
        out
    }

    /// Field names referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.text;
        while let Some(start) = rest.find(OPEN) {
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                break;
            };
            names.push(after_open[..end].trim());
            rest = &after_open[end + CLOSE.len()..];
        }
        names
    }
}
