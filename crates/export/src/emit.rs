//! Rendering of the final `.spec.ts` file

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use autoqa_common::paths::{resolve_path, to_slash_path};

use crate::aggregate::StepPlan;
use crate::playwright::escape_string;
use crate::template::ident_for_var;

/// Runtime helper module, relative to the project root, without extension
pub const HELPER_MODULE: &str = "tests/helpers/autoqa-env";

/// Test title: the spec file stem with `-` read as spaces
pub fn test_name_from_spec_path(spec_path: &str) -> String {
    let file = spec_path.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = match file.len().checked_sub(3) {
        Some(cut) if file.is_char_boundary(cut) && file[cut..].eq_ignore_ascii_case(".md") => &file[..cut],
        _ => file,
    };
    if stem.is_empty() {
        "Exported Test".to_string()
    } else {
        stem.replace('-', " ")
    }
}

/// Import specifier of the helper module as seen from the export directory
pub fn helper_import_path(cwd: &Path, export_dir: &Path) -> String {
    let from = resolve_path(cwd, export_dir);
    let to = resolve_path(cwd, Path::new(HELPER_MODULE));

    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from_parts.len() {
        relative.push("..");
    }
    for part in &to_parts[common..] {
        relative.push(part.as_os_str());
    }

    let relative = to_slash_path(&relative);
    if relative.starts_with("../") {
        relative
    } else {
        format!("./{relative}")
    }
}

/// `const <ident> = getEnvVar('AUTOQA_<NAME>')` lines, sorted by name
pub fn env_declarations(env_vars: &BTreeSet<String>) -> String {
    env_vars
        .iter()
        .map(|name| format!("const {} = getEnvVar('AUTOQA_{}')\n", ident_for_var(name), name))
        .collect()
}

/// Full content of the generated test file
pub fn render_test_file(plan: &StepPlan, test_name: &str, helper_import: &str) -> String {
    let login = if plan.login_base_url {
        "const loginBaseUrl = getEnvVar('AUTOQA_LOGIN_BASE_URL')\n"
    } else {
        ""
    };
    let body = plan
        .steps
        .iter()
        .map(|step| step.render())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "import {{ test, expect }} from '@playwright/test'
import {{ loadEnvFiles, getEnvVar }} from '{helper}'

loadEnvFiles()

const baseUrl = getEnvVar('AUTOQA_BASE_URL')
{login}{env}
test('{name}', async ({{ page }}) => {{
{body}
}})
",
        helper = escape_string(helper_import),
        env = env_declarations(&plan.env_vars),
        name = escape_string(test_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::StepCode;

    #[test]
    fn test_test_name_from_spec_path() {
        assert_eq!(test_name_from_spec_path("specs/saucedemo-01-login.md"), "saucedemo 01 login");
        assert_eq!(test_name_from_spec_path("C:\\specs\\Checkout.MD"), "Checkout");
        assert_eq!(test_name_from_spec_path("plain"), "plain");
        assert_eq!(test_name_from_spec_path("specs/"), "Exported Test");
    }

    #[test]
    fn test_helper_import_path() {
        let cwd = Path::new("/project");
        assert_eq!(helper_import_path(cwd, Path::new("tests/autoqa")), "../helpers/autoqa-env");
        assert_eq!(helper_import_path(cwd, Path::new("e2e/generated")), "../../tests/helpers/autoqa-env");
        assert_eq!(helper_import_path(cwd, Path::new("tests")), "./helpers/autoqa-env");
        assert_eq!(helper_import_path(cwd, Path::new(".")), "./tests/helpers/autoqa-env");
    }

    #[test]
    fn test_env_declarations_sorted() {
        let vars: BTreeSet<String> = ["PASSWORD", "USERNAME", "API_KEY"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            env_declarations(&vars),
            "const api_key = getEnvVar('AUTOQA_API_KEY')\nconst password = getEnvVar('AUTOQA_PASSWORD')\nconst username = getEnvVar('AUTOQA_USERNAME')\n"
        );
    }

    #[test]
    fn test_render_test_file() {
        let plan = StepPlan {
            steps: vec![StepCode {
                index: 1,
                comment: "Navigate to AUTOQA_BASE_URL/login".to_string(),
                body: "  await page.goto(new URL('/login', baseUrl).toString());".to_string(),
            }],
            env_vars: ["USERNAME".to_string()].into_iter().collect(),
            login_base_url: true,
        };
        let content = render_test_file(&plan, "login", "../helpers/autoqa-env");
        assert_eq!(
            content,
            "import { test, expect } from '@playwright/test'
import { loadEnvFiles, getEnvVar } from '../helpers/autoqa-env'

loadEnvFiles()

const baseUrl = getEnvVar('AUTOQA_BASE_URL')
const loginBaseUrl = getEnvVar('AUTOQA_LOGIN_BASE_URL')
const username = getEnvVar('AUTOQA_USERNAME')

test('login', async ({ page }) => {
  // Step 1: Navigate to AUTOQA_BASE_URL/login
  await page.goto(new URL('/login', baseUrl).toString());
})
"
        );
    }

    #[test]
    fn test_render_minimal_file() {
        let content = render_test_file(&StepPlan::default(), "it's", "./helpers/autoqa-env");
        assert!(content.contains("const baseUrl = getEnvVar('AUTOQA_BASE_URL')\n\ntest('it\\'s', async ({ page }) => {\n\n})\n"));
        assert!(!content.contains("loginBaseUrl"));
    }
}
