//! Generation prompt template.
//!
//! The template is a JSON document (a Gemini request body) loaded once at
//! startup. String leaves may contain `{{name}}` placeholders that are filled
//! per request; the loaded template itself is never modified.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::ServiceError;

/// Immutable prompt template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: Value,
    source: PathBuf,
}

impl PromptTemplate {
    /// Load the template file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ServiceError::load(path, e))?;
        let template = serde_json::from_str(&raw).map_err(|e| ServiceError::load(path, e))?;
        Ok(Self {
            template,
            source: path.to_path_buf(),
        })
    }

    pub fn from_value(template: Value) -> Self {
        Self {
            template,
            source: PathBuf::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn template(&self) -> &Value {
        &self.template
    }

    /// Copy of the template with every `{{key}}` replaced by its value.
    /// Unknown placeholders are left as they are.
    pub fn render(&self, vars: &HashMap<&str, String>) -> Value {
        substitute(&self.template, vars)
    }
}

fn substitute(value: &Value, vars: &HashMap<&str, String>) -> Value {
    match value {
        Value::String(text) => Value::String(fill(text, vars)),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute(v, vars)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn fill(text: &str, vars: &HashMap<&str, String>) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let key = after[..close].trim();
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn vars() -> HashMap<&'static str, String> {
        HashMap::from([
            ("outfit_name", "버블 헴 드레스".to_string()),
            ("keywords", "#Volume #BubbleHem".to_string()),
        ])
    }

    #[test]
    fn test_render_fills_nested_strings() {
        let template = PromptTemplate::from_value(json!({
            "contents": [{"parts": [{"text": "Outfit: {{outfit_name}} ({{ keywords }})"}]}],
            "generationConfig": {"temperature": 0.7}
        }));
        let rendered = template.render(&vars());
        assert_eq!(
            rendered["contents"][0]["parts"][0]["text"],
            "Outfit: 버블 헴 드레스 (#Volume #BubbleHem)"
        );
        assert_eq!(rendered["generationConfig"]["temperature"], 0.7);
        // the loaded template is untouched
        assert_eq!(
            template.template()["contents"][0]["parts"][0]["text"],
            "Outfit: {{outfit_name}} ({{ keywords }})"
        );
    }

    #[test]
    fn test_unknown_and_unterminated_placeholders() {
        let v = vars();
        assert_eq!(fill("{{missing}} {{outfit_name}}", &v), "{{missing}} 버블 헴 드레스");
        assert_eq!(fill("open {{outfit_name", &v), "open {{outfit_name");
        assert_eq!(fill("no placeholders", &v), "no placeholders");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"contents": [{{"parts": [{{"text": "{{{{outfit_name}}}}"}}]}}]}}"#).unwrap();
        let template = PromptTemplate::load(file.path()).unwrap();
        assert_eq!(template.source(), file.path());
        assert_eq!(
            template.render(&vars())["contents"][0]["parts"][0]["text"],
            "버블 헴 드레스"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = PromptTemplate::load("/nonexistent/gemini_prompt_config.json").unwrap_err();
        assert!(matches!(err, ServiceError::Load { .. }));
    }
}
