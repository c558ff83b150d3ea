use fancy_regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::errors::RegexReplaceError;

static MATCH_REPLACEMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\$|&|(\d\d?)|<([^>]*)>)").unwrap());

/// Replaces the first (or, when `is_global`, every) match of `pattern` in `text`.
///
/// The replacement string understands `$$`, `$&`, `$1`..`$99` and `$<name>`.
pub fn apply_text_replacement(
    text: &str,
    pattern: &Regex,
    replacement: &str,
    is_global: bool,
) -> Result<String, RegexReplaceError> {
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;
    for captures in pattern.captures_iter(text) {
        let captures = captures?;
        let Some(whole) = captures.get(0) else {
            continue;
        };
        result.push_str(&text[last_end..whole.start()]);
        result.push_str(&apply_match_replacement(replacement, &captures)?);
        last_end = whole.end();
        if !is_global {
            break;
        }
    }
    result.push_str(&text[last_end..]);
    Ok(result)
}

/// Expands the `$` references of `replacement` against one match.
pub fn apply_match_replacement(
    replacement: &str,
    captures: &Captures,
) -> Result<String, RegexReplaceError> {
    let expanded = MATCH_REPLACEMENT_PATTERN.try_replacen(replacement, 0, |inner: &Captures<'_>| {
        let reference = inner.get(0).map_or("", |m| m.as_str());
        if let Some(digits) = inner.get(1) {
            return match digits.as_str().parse::<usize>() {
                Ok(idx) if idx > 0 && idx < captures.len() => {
                    captures.get(idx).map_or(String::new(), |m| m.as_str().to_string())
                }
                _ => reference.to_string(),
            };
        }
        if let Some(name) = inner.get(2) {
            return captures
                .name(name.as_str())
                .map_or(String::new(), |m| m.as_str().to_string());
        }
        match reference {
            "$$" => "$".to_string(),
            "$&" => captures.get(0).map_or(String::new(), |m| m.as_str().to_string()),
            _ => reference.to_string(),
        }
    })?;
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_and_global() {
        let re = Regex::new("a").unwrap();
        assert_eq!(apply_text_replacement("banana", &re, "o", false).unwrap(), "bonana");
        assert_eq!(apply_text_replacement("banana", &re, "o", true).unwrap(), "bonono");
    }

    #[test]
    fn group_references() {
        let re = Regex::new(r"(?<word>\w+)-(\d+)").unwrap();
        assert_eq!(
            apply_text_replacement("item-42", &re, "$2:$<word>:$&:$$", false).unwrap(),
            "42:item:item-42:$"
        );
    }

    #[test]
    fn no_match_leaves_text() {
        let re = Regex::new("z").unwrap();
        assert_eq!(apply_text_replacement("食べる", &re, "x", true).unwrap(), "食べる");
    }
}
