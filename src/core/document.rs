//! Skill head documents (`SKILL.md`): YAML frontmatter plus a markdown body.

use serde_yaml::{Mapping, Value};

use crate::error::{Result, SyncError};

use super::fields::{self, BOOKKEEPING_FIELD};
use super::pointer::POINTER_MARKER;

/// File name of a skill's head document.
pub const HEAD_DOCUMENT: &str = "SKILL.md";

const FENCE: &str = "---";

/// A parsed head document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub frontmatter: Mapping,
    pub body: String,
}

/// Whether a projection references canonical or still carries its own content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentForm {
    Pointer,
    Raw,
}

impl Document {
    #[must_use]
    pub const fn new(frontmatter: Mapping, body: String) -> Self {
        Self { frontmatter, body }
    }

    /// Parse a document, splitting an optional leading `---` fenced YAML block.
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let Some(rest) = strip_fence_line(content) else {
            return Ok(Self::new(Mapping::new(), content.to_string()));
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == FENCE {
                let yaml = &rest[..offset];
                let body = &rest[offset + line.len()..];
                let frontmatter = parse_frontmatter(yaml)?;
                return Ok(Self::new(frontmatter, body.to_string()));
            }
            offset += line.len();
        }

        Err(SyncError::InvalidDocument(
            "frontmatter opened with --- but never closed".to_string(),
        ))
    }

    /// Render back to `---` fenced frontmatter and body.
    pub fn render(&self) -> Result<String> {
        if self.frontmatter.is_empty() {
            return Ok(self.body.clone());
        }
        let yaml = serde_yaml::to_string(&self.frontmatter)?;
        Ok(format!("{FENCE}\n{yaml}{FENCE}\n{}", self.body))
    }

    #[must_use]
    pub fn form(&self) -> DocumentForm {
        if self.pointer().is_some() {
            DocumentForm::Pointer
        } else {
            DocumentForm::Raw
        }
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.form() == DocumentForm::Pointer
    }

    /// The pointer string when the body is a single `@<path>/SKILL.md` reference.
    #[must_use]
    pub fn pointer(&self) -> Option<&str> {
        let trimmed = self.body.trim();
        let reference = trimmed.strip_prefix(POINTER_MARKER)?;
        if reference.contains(char::is_whitespace) {
            return None;
        }
        let dir = reference.strip_suffix(HEAD_DOCUMENT)?;
        dir.ends_with('/').then_some(trimmed)
    }

    #[must_use]
    pub fn identity(&self) -> Mapping {
        fields::identity_fields(&self.frontmatter)
    }

    #[must_use]
    pub fn recorded_hash(&self) -> Option<&str> {
        fields::recorded_hash(&self.frontmatter)
    }

    pub fn set_bookkeeping(&mut self, record: Value) {
        self.frontmatter
            .insert(Value::from(BOOKKEEPING_FIELD), record);
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.frontmatter.get("name").and_then(Value::as_str)
    }
}

/// Body text comparison that ignores trailing whitespace and line endings.
#[must_use]
pub fn bodies_equal(left: &str, right: &str) -> bool {
    normalize_body(left) == normalize_body(right)
}

fn normalize_body(body: &str) -> String {
    body.replace("\r\n", "\n").trim_end().to_string()
}

fn strip_fence_line(content: &str) -> Option<&str> {
    let rest = content.strip_prefix(FENCE)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn parse_frontmatter(yaml: &str) -> Result<Mapping> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(other) => Err(SyncError::InvalidDocument(format!(
            "frontmatter must be a mapping, found {}",
            type_name(&other)
        ))),
        Err(err) => Err(SyncError::InvalidDocument(format!(
            "frontmatter is not valid YAML: {err}"
        ))),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
