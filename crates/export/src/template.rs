//! Recovery of `{{VAR}}` template variables from raw spec text
//!
//! The trace only holds rendered values. The raw Markdown is the one place
//! that says which of them were symbolic, so every generator that could leak
//! a rendered value consults it first.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::naming::{is_file_binding, is_reserved_word};
use crate::playwright::{relative_to_origin, GenContext, Needs};
use crate::spec_source::{section, NUMBERED_ITEM};

/// Variable that resolves to the `baseUrl` binding
pub const BASE_URL_VAR: &str = "BASE_URL";
/// Variable that resolves to the `loginBaseUrl` binding
pub const LOGIN_BASE_URL_VAR: &str = "LOGIN_BASE_URL";

pub static TEMPLATE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").expect("valid regex"));

static EXACT_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\{\{\s*([A-Z0-9_]+)\s*\}\}\s*$").expect("valid regex"));

static VAR_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9_]+$").expect("valid regex"));

static NAVIGATE_TARGET: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)^navigate\s+to\s+(\S+)").expect("valid regex"),
        Regex::new(r"^导航到\s*(\S+)").expect("valid regex"),
        Regex::new(r"(?i)^go\s+to\s+(\S+)").expect("valid regex"),
    ]
});

static QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]+)"|'([^']+)'|“([^”]+)”|「([^」]+)」"#).expect("valid regex")
});

static ELEMENT_ASSERTION: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r#"(?i)^(?:verify|assert)\s+(?:that\s+)?(?:the\s+)?["']?[^"']+["']?\s+(?:button|link|element|icon)\s+is\s+visible"#)
            .expect("valid regex"),
        Regex::new(r#"^验证\s*["']?[^"']+["']?\s*(?:按钮|链接|元素|图标)\s*(?:可见|显示)"#).expect("valid regex"),
    ]
});

static TEXT_ASSERTION: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r#"(?i)^(?:verify|assert)\s+(?:that\s+)?(?:the\s+)?page\s+(?:shows|contains|displays)\s+(?:text\s+)?["']?([^"']+)["']?"#)
            .expect("valid regex"),
        Regex::new(r#"^验证\s*(?:页面)?(?:显示|包含)\s*["']?([^"']+)["']?"#).expect("valid regex"),
        Regex::new(r#"^断言\s*(?:页面)?(?:显示|包含)\s*["']?([^"']+)["']?"#).expect("valid regex"),
    ]
});

static URL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:https?://[^\s{"'“”「」]*|/[^\s{"'“”「」]*)?\{\{\s*[A-Z0-9_]+\s*\}\}[^\s"'“”「」,;]*"#)
        .expect("valid regex")
});

/// Variables used by one step of the raw spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepVarInfo {
    /// Distinct names in first-seen order
    pub vars: Vec<String>,
    /// Step text before rendering, list marker removed
    pub raw_text: String,
}

impl StepVarInfo {
    /// First variable that is not one of the base URLs
    pub fn first_value_var(&self) -> Option<&str> {
        self.vars
            .iter()
            .map(String::as_str)
            .find(|v| *v != BASE_URL_VAR && *v != LOGIN_BASE_URL_VAR)
    }
}

/// Distinct `{{NAME}}` variables in first-seen order
pub fn extract_template_vars(text: &str) -> Vec<String> {
    let mut vars: Vec<String> = Vec::new();
    for cap in TEMPLATE_VAR.captures_iter(text) {
        let name = &cap[1];
        if !vars.iter().any(|v| v == name) {
            vars.push(name.to_string());
        }
    }
    vars
}

/// Whether `name` is a well-formed template variable name
pub fn is_var_name(name: &str) -> bool {
    VAR_NAME.is_match(name)
}

/// Map each numbered step of the `## Steps` section that uses at least one
/// variable to its [`StepVarInfo`]
pub fn parse_raw_spec_vars(raw: &str) -> BTreeMap<u32, StepVarInfo> {
    let mut steps = BTreeMap::new();
    let Some(body) = section(raw, "steps") else {
        return steps;
    };

    for line in body.lines() {
        let Some(cap) = NUMBERED_ITEM.captures(line) else {
            continue;
        };
        let Ok(index) = cap[1].parse::<u32>() else {
            continue;
        };
        let raw_text = cap[2].trim().to_string();
        let vars = extract_template_vars(&raw_text);
        if !vars.is_empty() {
            steps.insert(index, StepVarInfo { vars, raw_text });
        }
    }
    steps
}

/// First token after "navigate to", "go to" or "导航到"
pub fn navigate_target(step_text: &str) -> Option<&str> {
    let text = step_text.trim_start();
    NAVIGATE_TARGET
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// First quoted segment of a step
pub fn quoted_value(step_text: &str) -> Option<&str> {
    let cap = QUOTED.captures(step_text)?;
    (1..=4).find_map(|i| cap.get(i)).map(|m| m.as_str())
}

/// Text an assertion step expects on the page.
///
/// "page shows/contains/displays X" and the 验证/断言 forms win over the
/// first quoted segment. Element-visibility phrasings yield `None`.
pub fn assertion_text_value(step_text: &str) -> Option<&str> {
    let text = step_text.trim();
    if ELEMENT_ASSERTION.iter().any(|re| re.is_match(text)) {
        return None;
    }
    TEXT_ASSERTION
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
        .or_else(|| quoted_value(text).map(str::trim))
}

/// First URL-like token of a step that carries a `{{VAR}}`, trailing
/// sentence punctuation removed
pub fn url_token(step_text: &str) -> Option<&str> {
    URL_TOKEN
        .find(step_text)
        .map(|m| m.as_str().trim_end_matches(['.', ')', '。']))
}

/// Whether `raw` starts with `{{BASE_URL}}` or `{{LOGIN_BASE_URL}}`
pub fn starts_with_base_var(raw: &str) -> bool {
    TEMPLATE_VAR
        .captures(raw.trim_start())
        .filter(|cap| cap.get(0).map_or(false, |m| m.start() == 0))
        .map_or(false, |cap| &cap[1] == BASE_URL_VAR || &cap[1] == LOGIN_BASE_URL_VAR)
}

/// Name of the variable when `text` is nothing but one `{{VAR}}`
pub fn exact_var(text: &str) -> Option<&str> {
    EXACT_VAR
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// JavaScript binding that holds the value of variable `name` at run time
pub fn ident_for_var(name: &str) -> String {
    match name {
        BASE_URL_VAR => "baseUrl".to_string(),
        LOGIN_BASE_URL_VAR => "loginBaseUrl".to_string(),
        _ => {
            let mut ident = name.to_ascii_lowercase();
            if ident.starts_with(|c: char| c.is_ascii_digit()) {
                ident.insert(0, '_');
            }
            if is_reserved_word(&ident) || is_file_binding(&ident) {
                ident.push('_');
            }
            ident
        }
    }
}

/// Expression that evaluates to a raw value at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExpr {
    pub expr: String,
    pub needs: Needs,
    /// Variables referenced, first-seen order
    pub vars: Vec<String>,
}

/// Turn a raw value into an expression.
///
/// `{{VAR}}` alone becomes a binding reference. Text mixed with variables
/// becomes a template literal. Returns `None` when `raw` has no variables.
pub fn template_expression(raw: &str) -> Option<TemplateExpr> {
    if let Some(name) = exact_var(raw) {
        return Some(TemplateExpr {
            expr: ident_for_var(name),
            needs: Needs::for_var(name),
            vars: vec![name.to_string()],
        });
    }

    let vars = extract_template_vars(raw);
    if vars.is_empty() {
        return None;
    }

    let mut needs = Needs::default();
    let mut body = String::with_capacity(raw.len() + 8);
    let mut last = 0;
    for cap in TEMPLATE_VAR.captures_iter(raw) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        body.push_str(&escape_template_text(&raw[last..whole.start()]));
        body.push_str("${");
        body.push_str(&ident_for_var(name.as_str()));
        body.push('}');
        needs.merge(Needs::for_var(name.as_str()));
        last = whole.end();
    }
    body.push_str(&escape_template_text(&raw[last..]));

    Some(TemplateExpr {
        expr: format!("`{body}`"),
        needs,
        vars,
    })
}

fn escape_template_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Text quoted in the `// Step N:` comment.
///
/// Symbolic values are shown as their `AUTOQA_<NAME>` key. Absolute
/// navigate URLs on a known origin are reduced to their path. Line breaks
/// are flattened so the text stays inside the comment.
pub fn redact_step_text(step_text: &str, ctx: &GenContext<'_>) -> String {
    let redacted = match ctx.step_vars {
        Some(info) if !info.vars.is_empty() => TEMPLATE_VAR
            .replace_all(&info.raw_text, "AUTOQA_$1")
            .into_owned(),
        _ => navigate_path(step_text, ctx)
            .map(|path| format!("Navigate to {path}"))
            .unwrap_or_else(|| step_text.to_string()),
    };
    flatten_line(&redacted)
}

fn navigate_path(step_text: &str, ctx: &GenContext<'_>) -> Option<String> {
    let target = navigate_target(step_text)?;
    if !target.starts_with("http") {
        return None;
    }
    relative_to_origin(target, ctx.base_url)
        .or_else(|| ctx.login_base_url.and_then(|login| relative_to_origin(target, login)))
}

/// Collapse line breaks into spaces
pub fn flatten_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
