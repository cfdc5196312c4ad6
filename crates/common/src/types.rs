//! Core types for AutoQA
//!
//! [`ActionRecord`] mirrors one line of a run's `ir.jsonl` trace. Keys are
//! camelCase on the wire; unknown keys are ignored so that newer agents can
//! add fields without breaking the exporter.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Browser tool that produced a record
///
/// This is the only input that decides which generator runs for a record.
/// Tool names this build does not know are kept verbatim in [`ToolName::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolName {
    Navigate,
    Click,
    Fill,
    SelectOption,
    AssertTextPresent,
    AssertElementVisible,
    Scroll,
    Wait,
    Other(String),
}

impl ToolName {
    pub fn as_str(&self) -> &str {
        match self {
            ToolName::Navigate => "navigate",
            ToolName::Click => "click",
            ToolName::Fill => "fill",
            ToolName::SelectOption => "select_option",
            ToolName::AssertTextPresent => "assertTextPresent",
            ToolName::AssertElementVisible => "assertElementVisible",
            ToolName::Scroll => "scroll",
            ToolName::Wait => "wait",
            ToolName::Other(name) => name,
        }
    }

    /// Whether the tool targets a page element and therefore needs a chosen locator
    pub fn requires_locator(&self) -> bool {
        matches!(
            self,
            ToolName::Click | ToolName::Fill | ToolName::SelectOption | ToolName::AssertElementVisible
        )
    }
}

impl From<String> for ToolName {
    fn from(name: String) -> Self {
        match name.as_str() {
            "navigate" => ToolName::Navigate,
            "click" => ToolName::Click,
            "fill" => ToolName::Fill,
            "select_option" => ToolName::SelectOption,
            "assertTextPresent" => ToolName::AssertTextPresent,
            "assertElementVisible" => ToolName::AssertElementVisible,
            "scroll" => ToolName::Scroll,
            "wait" => ToolName::Wait,
            _ => ToolName::Other(name),
        }
    }
}

impl From<&str> for ToolName {
    fn from(name: &str) -> Self {
        ToolName::from(name.to_string())
    }
}

impl From<ToolName> for String {
    fn from(tool: ToolName) -> Self {
        tool.as_str().to_string()
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the value typed by a `fill` action was captured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillValue {
    /// Value typed verbatim, safe to embed
    Literal { value: String },
    /// Value came from a `{{NAME}}` template variable
    TemplateVar { name: String },
    /// Value was typed but cannot be recovered from the trace
    Redacted,
}

/// Tool-specific payload of a record
///
/// Kept as raw JSON; generators read it through the typed accessors so that
/// a missing field becomes a code generation error instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolInput(pub Map<String, Value>);

impl ToolInput {
    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Rendered URL of a `navigate` action
    pub fn url(&self) -> Option<&str> {
        self.non_empty_str("url")
    }

    /// Option label of a `select_option` action
    pub fn label(&self) -> Option<&str> {
        self.non_empty_str("label")
    }

    /// Expected text of an `assertTextPresent` action
    pub fn text(&self) -> Option<&str> {
        self.non_empty_str("text")
    }

    /// Disambiguation index among duplicate text matches
    pub fn visible_nth(&self) -> Option<u64> {
        self.0.get("visibleNth").and_then(Value::as_u64)
    }

    /// Duration of a `wait` action in seconds
    pub fn seconds(&self) -> Option<f64> {
        self.0
            .get("seconds")
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite() && *s >= 0.0)
    }

    /// Captured value of a `fill` action
    pub fn fill_value(&self) -> Option<FillValue> {
        self.0
            .get("fillValue")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn insert(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }
}

/// Result of executing the tool during the live run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Descriptive snapshot of an element, used for naming only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementFingerprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_attr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_attr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_snippet: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorValidation {
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Locator descriptor; `code` is a ready-to-emit Playwright expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub validation: LocatorValidation,
}

impl Locator {
    /// A locator is usable when it has code and was validated as unique upstream
    pub fn is_usable(&self) -> bool {
        !self.code.trim().is_empty() && self.validation.unique
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    #[serde(default)]
    pub fingerprint: ElementFingerprint,
    #[serde(default)]
    pub locator_candidates: Vec<Locator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_locator: Option<Locator>,
}

/// One recorded browser action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub spec_path: String,
    #[serde(default)]
    pub step_index: Option<u32>,
    pub tool_name: ToolName,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_input: ToolInput,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
}

impl ActionRecord {
    pub fn is_ok(&self) -> bool {
        self.outcome.ok
    }

    /// Locator code of the chosen locator, if it is usable
    pub fn chosen_locator_code(&self) -> Option<&str> {
        self.element
            .as_ref()
            .and_then(|e| e.chosen_locator.as_ref())
            .filter(|l| l.is_usable())
            .map(|l| l.code.as_str())
    }

    pub fn has_valid_chosen_locator(&self) -> bool {
        self.chosen_locator_code().is_some()
    }

    /// Fingerprint of the target element, empty when none was captured
    pub fn fingerprint(&self) -> ElementFingerprint {
        self.element
            .as_ref()
            .map(|e| e.fingerprint.clone())
            .unwrap_or_default()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Kind of a spec step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    #[default]
    Action,
    Assertion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownSpecStep {
    pub index: u32,
    pub text: String,
    #[serde(default)]
    pub kind: StepKind,
}

/// A test spec after template rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownSpec {
    #[serde(default)]
    pub preconditions: Vec<String>,
    pub steps: Vec<MarkdownSpecStep>,
}

impl MarkdownSpec {
    pub fn step(&self, index: u32) -> Option<&MarkdownSpecStep> {
        self.steps.iter().find(|s| s.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fill_record() {
        let line = r#"{
            "runId": "run-1",
            "specPath": "/project/specs/login.md",
            "stepIndex": 2,
            "toolName": "fill",
            "toolInput": { "textLength": 8, "fillValue": { "kind": "template_var", "name": "USERNAME" } },
            "outcome": { "ok": true },
            "element": {
                "fingerprint": { "tagName": "input", "testId": "username-input" },
                "locatorCandidates": [],
                "chosenLocator": {
                    "kind": "getByTestId",
                    "value": "username-input",
                    "code": "page.getByTestId('username-input')",
                    "validation": { "unique": true }
                }
            },
            "timestamp": 1700000000000
        }"#;
        let record: ActionRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.tool_name, ToolName::Fill);
        assert_eq!(record.step_index, Some(2));
        assert_eq!(
            record.tool_input.fill_value(),
            Some(FillValue::TemplateVar { name: "USERNAME".to_string() })
        );
        assert_eq!(
            record.chosen_locator_code(),
            Some("page.getByTestId('username-input')")
        );
        assert_eq!(record.fingerprint().test_id.as_deref(), Some("username-input"));
    }

    #[test]
    fn test_fill_value_variants() {
        let literal: FillValue = serde_json::from_str(r#"{"kind":"literal","value":"暖场"}"#).unwrap();
        assert_eq!(literal, FillValue::Literal { value: "暖场".to_string() });

        let redacted: FillValue = serde_json::from_str(r#"{"kind":"redacted"}"#).unwrap();
        assert_eq!(redacted, FillValue::Redacted);
    }

    #[test]
    fn test_unknown_tool_is_preserved() {
        let line = r#"{"stepIndex":1,"toolName":"hover","toolInput":{},"outcome":{"ok":true}}"#;
        let record: ActionRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.tool_name, ToolName::Other("hover".to_string()));
        assert_eq!(record.tool_name.to_string(), "hover");
        assert!(!record.tool_name.requires_locator());
    }

    #[test]
    fn test_null_step_index_and_tool_input() {
        let line = r#"{"stepIndex":null,"toolName":"scroll","toolInput":null,"outcome":{"ok":false}}"#;
        let record: ActionRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.step_index, None);
        assert!(record.tool_input.0.is_empty());
        assert!(!record.is_ok());
    }

    #[test]
    fn test_locator_not_unique_is_unusable() {
        let locator = Locator {
            kind: "css".to_string(),
            value: ".btn".to_string(),
            code: "page.locator('.btn')".to_string(),
            validation: LocatorValidation::default(),
        };
        assert!(!locator.is_usable());

        let blank = Locator {
            code: "  ".to_string(),
            validation: LocatorValidation { unique: true, ..Default::default() },
            ..Default::default()
        };
        assert!(!blank.is_usable());
    }

    #[test]
    fn test_tool_input_accessors() {
        let input = ToolInput::default()
            .insert("seconds", 1.5)
            .insert("visibleNth", 0)
            .insert("text", "");
        assert_eq!(input.seconds(), Some(1.5));
        assert_eq!(input.visible_nth(), Some(0));
        assert_eq!(input.text(), None);

        let negative = ToolInput::default().insert("seconds", -1.0).insert("visibleNth", -2);
        assert_eq!(negative.seconds(), None);
        assert_eq!(negative.visible_nth(), None);
    }

    #[test]
    fn test_tool_name_round_trips_as_string() {
        let json = serde_json::to_string(&ToolName::SelectOption).unwrap();
        assert_eq!(json, r#""select_option""#);
        assert!(ToolName::from("assertElementVisible").requires_locator());
        assert!(!ToolName::from("navigate").requires_locator());
    }
}
