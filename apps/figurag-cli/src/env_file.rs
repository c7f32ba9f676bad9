//! Minimal `.env` support: load into the process environment and upsert keys.

use anyhow::Context;
use std::fs;
use std::path::Path;

/// `KEY=value` with optional `export ` prefix and matching quotes.
/// Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
        .unwrap_or(value);
    Some((key, value))
}

/// Exports every pair from `path` that is not already set. A missing file
/// is not an error. Returns the number of variables set.
pub fn load_env_file(path: &Path) -> anyhow::Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut set = 0;
    for (key, value) in text.lines().filter_map(parse_line) {
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, value);
            set += 1;
        }
    }
    Ok(set)
}

/// Replaces the `key=` line in `path`, or appends one. Other lines are kept.
pub fn upsert_key(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        String::new()
    };
    let entry = format!("{key}={value}");
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| match parse_line(line) {
            Some((k, _)) if k == key => {
                replaced = true;
                entry.clone()
            }
            _ => line.to_string(),
        })
        .collect();
    if !replaced {
        lines.push(entry);
    }
    let mut out = lines.join("\n");
    out.push('\n');
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

/// Environment variable holding the key for a provider name.
pub fn key_var_for(provider: &str) -> Option<&'static str> {
    match provider.to_ascii_lowercase().as_str() {
        "openai" => Some("OPENAI_API_KEY"),
        "zhipuai" | "zhipu" => Some("ZHIPUAI_API_KEY"),
        _ => None,
    }
}

/// OpenAI keys start with `sk-`; anything else is probably a paste error.
pub fn key_warning(provider: &str, key: &str) -> Option<&'static str> {
    (provider.eq_ignore_ascii_case("openai") && !key.starts_with("sk-"))
        .then_some("OpenAI API keys usually start with 'sk-'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quotes_and_export() {
        assert_eq!(parse_line("export A=\"x y\""), Some(("A", "x y")));
        assert_eq!(parse_line("B='1'"), Some(("B", "1")));
        assert_eq!(parse_line("C = plain "), Some(("C", "plain")));
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("=orphan"), None);
        assert_eq!(parse_line("no equals"), None);
    }

    #[test]
    fn provider_names() {
        assert_eq!(key_var_for("OpenAI"), Some("OPENAI_API_KEY"));
        assert_eq!(key_var_for("zhipu"), Some("ZHIPUAI_API_KEY"));
        assert_eq!(key_var_for("claude"), None);
        assert!(key_warning("openai", "abc").is_some());
        assert!(key_warning("openai", "sk-abc").is_none());
        assert!(key_warning("zhipuai", "abc").is_none());
    }
}
