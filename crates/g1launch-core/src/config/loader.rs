//! Environment variable loading helpers
//!
//! Keeps the primary → alias → default fallback chain in one place.

use std::env;
use std::path::Path;

/// Key/value pairs parsed from a `.env` file, in file order.
pub type DotenvVars = Vec<(String, String)>;

/// Parse `.env` content.
///
/// Blank lines and `#` comments are skipped, an optional `export ` prefix is
/// accepted. A quoted value ends at its closing quote, so a trailing comment
/// is dropped; an unquoted value loses its inline `# comment`. Later
/// duplicates win when applied.
pub fn parse_dotenv(content: &str) -> DotenvVars {
    let mut vars = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let raw = line[eq_pos + 1..].trim();
        let value = match raw.chars().next() {
            Some(q @ ('"' | '\'')) => match raw[1..].find(q) {
                Some(end) => &raw[1..1 + end],
                None => raw,
            },
            _ => match raw.find('#') {
                Some(pos) => raw[..pos].trim_end(),
                None => raw,
            },
        };
        if !key.is_empty() {
            vars.push((key.to_string(), value.to_string()));
        }
    }
    vars
}

/// Read `<dir>/.env`. Returns `None` when the file is missing or unreadable.
///
/// The values are not written into this process's environment; callers apply
/// them to child commands.
pub fn load_dotenv_from_dir(dir: &Path) -> Option<DotenvVars> {
    let path = dir.join(".env");
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            tracing::debug!(path = %path.display(), "Loaded .env");
            Some(parse_dotenv(&content))
        }
        Err(_) => None,
    }
}

/// Read the primary key or the first set alias, falling back to `default`
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Read the primary key or an alias; empty values count as unset
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Boolean env var: 0/false/no/off are false, anything else set is true
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    let v = env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()));
    match v.as_deref() {
        Some(s) => parse_bool(s),
        None => default,
    }
}

/// Comma separated list; empty items are dropped
pub fn env_list(primary: &str, aliases: &[&str], default: &[&str]) -> Vec<String> {
    match env_optional(primary, aliases) {
        Some(s) => split_list(&s),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn parse_bool(s: &str) -> bool {
    !matches!(
        s.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
