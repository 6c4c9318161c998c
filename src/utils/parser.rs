//! Text extraction primitives.
//!
//! Line-oriented lookups used to pull single values out of small build and
//! vendor description files.

use regex::Regex;

/// Return the text after the first double quote, up to the next one, on the
/// first line that contains `marker`.
///
/// An unterminated quote yields the rest of the line. Lines that contain the
/// marker but no quote at all are skipped. Returns `None` when no line
/// qualifies.
pub fn quoted_value_after(content: &str, marker: &str) -> Option<String> {
    let quoted = Regex::new(r#""([^"]*)"?"#).ok()?;

    content
        .lines()
        .filter(|line| line.contains(marker))
        .find_map(|line| quoted.captures(line).map(|caps| caps[1].to_string()))
}

/// Look up `key` inside `[section]` of an INI document.
///
/// Keys are matched case-insensitively, section names exactly. Both `=` and
/// `:` delimiters are accepted; lines starting with `#` or `;` are comments.
pub fn ini_value(content: &str, section: &str, key: &str) -> Option<String> {
    let mut in_section = false;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == section;
            continue;
        }

        if !in_section {
            continue;
        }

        let Some(split_at) = line.find(['=', ':']) else {
            continue;
        };
        let (name, value) = line.split_at(split_at);
        if name.trim().eq_ignore_ascii_case(key) {
            return Some(value[1..].trim().to_string());
        }
    }

    None
}
