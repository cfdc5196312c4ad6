//! Identifier derivation and file-wide deduplication

use std::collections::HashSet;

use autoqa_common::ElementFingerprint;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bindings every generated file declares or imports itself
pub const FILE_BINDINGS: &[&str] = &[
    "test",
    "expect",
    "page",
    "baseUrl",
    "loginBaseUrl",
    "loadEnvFiles",
    "getEnvVar",
];

const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while",
    "with", "yield",
];

const TEST_ID_SUFFIXES: &[&str] = &["-input", "-button", "-btn", "-field"];

static PLACEHOLDER_PREFIXES: Lazy<[Regex; 6]> = Lazy::new(|| {
    [
        Regex::new(r"^请输入").expect("valid regex"),
        Regex::new(r"^输入").expect("valid regex"),
        Regex::new(r"^请").expect("valid regex"),
        Regex::new(r"(?i)^input\s+").expect("valid regex"),
        Regex::new(r"(?i)^enter\s+").expect("valid regex"),
        Regex::new(r"(?i)^your\s+").expect("valid regex"),
    ]
});

static CONST_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"const\s+([A-Za-z_$][0-9A-Za-z_$]*)\s*=").expect("valid regex")
});

/// JavaScript reserved word or global that cannot be rebound
pub fn is_reserved_word(ident: &str) -> bool {
    RESERVED_WORDS.contains(&ident)
}

pub fn is_file_binding(ident: &str) -> bool {
    FILE_BINDINGS.contains(&ident)
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// camelCase over words split on anything that is not ASCII alphanumeric or CJK.
///
/// CJK text is kept as-is; only the first character is lowercased and every
/// later word start is uppercased.
pub fn to_camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut word_start = false;

    for c in input.chars() {
        if !(c.is_ascii_alphanumeric() || is_cjk(c)) {
            word_start = true;
            continue;
        }
        if out.is_empty() {
            out.push(c.to_ascii_lowercase());
        } else if word_start {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        word_start = false;
    }
    out
}

/// Reduce `input` to a valid identifier, or `fallback` when nothing survives.
///
/// Non-ASCII script is dropped, a leading digit gets a `text` prefix and
/// reserved words get a trailing `_`.
pub fn sanitize_identifier(input: &str, fallback: &str) -> String {
    let mut ident: String = input.chars().filter(char::is_ascii_alphanumeric).collect();
    if ident.is_empty() {
        return fallback.to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert_str(0, "text");
    }
    if is_reserved_word(&ident) {
        ident.push('_');
    }
    ident
}

fn strip_test_id_suffixes(test_id: &str) -> String {
    let mut name = test_id.to_lowercase();
    for suffix in TEST_ID_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
        }
    }
    name
}

fn strip_placeholder_prefixes(placeholder: &str) -> String {
    PLACEHOLDER_PREFIXES
        .iter()
        .fold(placeholder.to_string(), |text, re| re.replace(&text, "").into_owned())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Base variable name for an element, from the most stable descriptor available.
///
/// Priority: test id, placeholder, text snippet, `id`, role + tag name, then
/// `element`. A level whose name sanitizes to nothing defers to the next one.
pub fn element_var_name(fingerprint: &ElementFingerprint) -> String {
    let by_test_id = || non_empty(&fingerprint.test_id).map(|id| to_camel_case(&strip_test_id_suffixes(id)));
    let by_placeholder = || {
        non_empty(&fingerprint.placeholder).map(|placeholder| {
            let stripped = to_camel_case(&strip_placeholder_prefixes(placeholder));
            if stripped.is_empty() {
                to_camel_case(placeholder)
            } else {
                stripped
            }
        })
    };
    let by_text = || non_empty(&fingerprint.text_snippet).map(to_camel_case);
    let by_id = || non_empty(&fingerprint.id).map(to_camel_case);
    let by_role_tag = || {
        let joined = [&fingerprint.role, &fingerprint.tag_name]
            .into_iter()
            .filter_map(non_empty)
            .collect::<String>();
        (!joined.is_empty()).then_some(joined)
    };

    let candidates: [&dyn Fn() -> Option<String>; 5] =
        [&by_test_id, &by_placeholder, &by_text, &by_id, &by_role_tag];

    candidates
        .iter()
        .filter_map(|candidate| candidate())
        .map(|name| sanitize_identifier(&name, ""))
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "element".to_string())
}

/// Name for a locator bound to literal text
pub fn text_var_name(text: &str) -> String {
    sanitize_identifier(&to_camel_case(text), "text")
}

/// Name for a locator bound to text built from variables, e.g. `usernameText`
pub fn symbolic_text_var_name(vars: &[String]) -> String {
    let words = vars.join(" ").to_lowercase();
    let base = sanitize_identifier(&to_camel_case(&words), "value");
    format!("{base}Text")
}

/// Names already bound in one generated file
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    /// Registry seeded with the file-level bindings and `extra` names
    pub fn seeded<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut used: HashSet<String> = FILE_BINDINGS.iter().map(|s| s.to_string()).collect();
        used.extend(extra.into_iter().map(Into::into));
        Self { used }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Reserve `base`, or the first free `base2`, `base3`, ...
    pub fn claim(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 2;
        while self.used.contains(&name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        self.used.insert(name.clone());
        name
    }
}

/// Name bound by the first `const` declaration of a fragment
pub fn declared_name(code: &str) -> Option<&str> {
    CONST_DECL
        .captures(code)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// Replace whole-word occurrences of `old` with `new`, leaving string,
/// template and regex literals and line comments untouched
pub fn rename_identifier(code: &str, old: &str, new: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let old_chars: Vec<char> = old.chars().collect();
    let mut out = String::with_capacity(code.len() + new.len());
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if matches!(c, '\'' | '"' | '`') {
            let end = skip_quoted(&chars, i);
            out.extend(&chars[i..end]);
            prev = Some(c);
            i = end;
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            let end = chars[i..]
                .iter()
                .position(|&ch| ch == '\n')
                .map_or(chars.len(), |p| i + p);
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }

        if c == '/' && starts_expression(prev) {
            let end = skip_regex(&chars, i);
            out.extend(&chars[i..end]);
            prev = Some('/');
            i = end;
            continue;
        }

        let at_word_start = i == 0 || !is_ident_char(chars[i - 1]);
        let end = i + old_chars.len();
        if at_word_start
            && end <= chars.len()
            && chars[i..end] == old_chars[..]
            && chars.get(end).map_or(true, |&n| !is_ident_char(n))
        {
            out.push_str(new);
            prev = old_chars.last().copied();
            i = end;
            continue;
        }

        out.push(c);
        if !c.is_whitespace() {
            prev = Some(c);
        }
        i += 1;
    }
    out
}

/// Whether a `/` after `prev` opens a regex literal rather than dividing
fn starts_expression(prev: Option<char>) -> bool {
    prev.map_or(true, |p| "(,=:[!&|?{};+-*%<>~^".contains(p))
}

/// Index just past the string literal opening at `start`
fn skip_quoted(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Index just past the regex literal (flags included) opening at `start`
fn skip_regex(chars: &[char], start: usize) -> usize {
    let mut in_class = false;
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' => return i,
            '[' => {
                in_class = true;
                i += 1;
            }
            ']' => {
                in_class = false;
                i += 1;
            }
            '/' if !in_class => {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return i;
            }
            _ => i += 1,
        }
    }
    chars.len()
}

/// Give the declaration in `code` a name unused in the file so far
pub fn dedupe_fragment(code: &str, registry: &mut NameRegistry) -> String {
    let Some(name) = declared_name(code) else {
        return code.to_string();
    };
    let claimed = registry.claim(name);
    if claimed == name {
        code.to_string()
    } else {
        rename_identifier(code, name, &claimed)
    }
}
