use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier shared by every step kind.
///
/// Text and screenshot steps get a generated id; list steps carry the id the
/// capture side chose so that later column selections land on the same step.
pub type StepId = u64;

/// Data needed to relocate a captured element.
///
/// Anything the capture method wants to remember beyond `selector`, `tag` and
/// `attribute` goes in `extra`, which is flattened into the same JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorDescriptor {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SelectorDescriptor {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A single scalar value captured from one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStep {
    pub id: StepId,
    pub label: String,
    pub data: String,
    #[serde(rename = "selectorObj")]
    pub selector: SelectorDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotStep {
    pub id: StepId,
    pub full_page: bool,
}

/// How the runner should reach the next page of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Pagination strategy, e.g. `clickNext` or `scrollDown`.
    #[serde(rename = "type")]
    pub kind: String,
    pub selector: String,
}

/// Repeating-row extraction: one container selector plus named per-row fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStep {
    pub id: StepId,
    pub list_selector: String,
    /// Keeps the order in which columns were first captured.
    pub fields: IndexMap<String, TextStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Text,
    Screenshot,
    List,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Text => "text",
            StepKind::Screenshot => "screenshot",
            StepKind::List => "list",
        };
        f.write_str(name)
    }
}

/// One recorded unit of a browsing/extraction workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step {
    Text(TextStep),
    Screenshot(ScreenshotStep),
    List(ListStep),
}

impl Step {
    pub fn id(&self) -> StepId {
        match self {
            Step::Text(step) => step.id,
            Step::Screenshot(step) => step.id,
            Step::List(step) => step.id,
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::Text(_) => StepKind::Text,
            Step::Screenshot(_) => StepKind::Screenshot,
            Step::List(_) => StepKind::List,
        }
    }

    pub fn as_text(&self) -> Option<&TextStep> {
        match self {
            Step::Text(step) => Some(step),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListStep> {
        match self {
            Step::List(step) => Some(step),
            _ => None,
        }
    }
}

/// One-line rendering used by the CLI step list.
impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Text(step) => write!(
                f,
                "[{}] text {:?} = {:?} ({})",
                step.id, step.label, step.data, step.selector.selector
            ),
            Step::Screenshot(step) => {
                let scope = if step.full_page { "full page" } else { "viewport" };
                write!(f, "[{}] screenshot ({})", step.id, scope)
            }
            Step::List(step) => {
                let names: Vec<&str> = step.fields.keys().map(String::as_str).collect();
                write!(
                    f,
                    "[{}] list {} fields=[{}]",
                    step.id,
                    step.list_selector,
                    names.join(", ")
                )?;
                if let Some(pagination) = &step.pagination {
                    write!(f, " paginate={}:{}", pagination.kind, pagination.selector)?;
                }
                if let Some(limit) = step.limit {
                    write!(f, " limit={}", limit)?;
                }
                Ok(())
            }
        }
    }
}
