//! Project configuration (`autoqa.config.json`)

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use autoqa_export::paths::DEFAULT_EXPORT_DIR;
use serde::{Deserialize, Serialize};
use url::Url;

/// Config file name, looked up in the project root
pub const CONFIG_FILE_NAME: &str = "autoqa.config.json";

/// Highest `plan.maxDepth` accepted
pub const MAX_PLAN_DEPTH: u32 = 10;

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AutoqaConfig {
    /// Config schema version, at least 1
    pub schema_version: u32,

    /// Agent run limits. Read by the agent runner sharing this file; the
    /// exporter only validates them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<Guardrails>,

    /// Where exported tests are written, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// Exploration settings for the agent runner; validated, not used by
    /// export or check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardrails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tool_calls_per_spec: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_errors: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries_per_step: Option<NonZeroU32>,
}

impl Guardrails {
    pub fn defaults() -> Self {
        Self {
            max_tool_calls_per_spec: NonZeroU32::new(200),
            max_consecutive_errors: NonZeroU32::new(8),
            max_retries_per_step: NonZeroU32::new(5),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanGuardrails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_agent_turns_per_run: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_snapshots_per_run: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages_per_run: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_token_per_run: Option<NonZeroU32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Functional,
    Form,
    Navigation,
    Responsive,
    Boundary,
    Security,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_types: Option<Vec<TestType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<PlanGuardrails>,
}

impl Default for AutoqaConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            guardrails: Some(Guardrails::defaults()),
            export_dir: Some(PathBuf::from(DEFAULT_EXPORT_DIR)),
            plan: None,
        }
    }
}

impl AutoqaConfig {
    /// Load `autoqa.config.json` from the project root, or defaults when absent
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let path = cwd.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {CONFIG_FILE_NAME}"))?;
        Self::from_json(&content)
    }

    /// Parse and validate config JSON
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)
            .with_context(|| format!("Invalid {CONFIG_FILE_NAME}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.schema_version >= 1, "schemaVersion must be at least 1");
        if let Some(plan) = &self.plan {
            if let Some(depth) = plan.max_depth {
                ensure!(depth <= MAX_PLAN_DEPTH, "plan.maxDepth must be at most {MAX_PLAN_DEPTH}");
            }
            if let Some(base_url) = &plan.base_url {
                ensure!(
                    is_http_url(base_url),
                    "plan.baseUrl must be an absolute http(s) URL"
                );
            }
        }
        Ok(())
    }

    /// Export directory, relative to the project root
    pub fn export_dir(&self) -> &Path {
        self.export_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_EXPORT_DIR))
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
