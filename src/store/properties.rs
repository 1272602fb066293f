//! Reader and writer for Java-style `.properties` files.
//!
//! Parsing follows the usual `java.util.Properties` rules: `\` line
//! continuations, `#`/`!` comments, `=`/`:`/whitespace separators, and
//! `\uXXXX` escapes. Files are read and written as UTF-8.

use std::collections::BTreeMap;
use std::str::Chars;

/// Parse `.properties` text into a sorted key/value map.
///
/// Later duplicates of a key overwrite earlier ones.
pub fn parse(input: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for line in logical_lines(input) {
        let (key, value) = split_entry(&line);
        entries.insert(unescape(key), unescape(value));
    }

    entries
}

/// Serialize entries as `key = value` lines in key order.
pub fn write(entries: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(&escape_key(key));
        out.push_str(" = ");
        out.push_str(&escape_value(value));
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Join physical lines into logical lines, dropping blanks and comments.
fn logical_lines(input: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for raw in input.lines() {
        let trimmed = raw.trim_start_matches([' ', '\t', '\u{c}']);

        let mut line = match current.take() {
            Some(mut pending) => {
                pending.push_str(trimmed);
                pending
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        if ends_with_continuation(&line) {
            line.pop();
            current = Some(line);
        } else {
            lines.push(line);
        }
    }

    // A continuation on the last line of the file.
    if let Some(pending) = current
        && !pending.is_empty()
    {
        lines.push(pending);
    }

    lines
}

/// A line continues when it ends in an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into its raw (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches([' ', '\t', '\u{c}']);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .map(|r| r.trim_start_matches([' ', '\t', '\u{c}']))
        .unwrap_or(rest);

    (key, rest)
}

/// Decode backslash escapes. Unknown escapes yield the escaped character.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            // Malformed or unpaired escapes are kept as literal text.
            Some('u') => match decode_unicode(&mut chars) {
                Some(decoded) => out.push(decoded),
                None => out.push_str("\\u"),
            },
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

/// Decode the four hex digits after `\u`, joining a UTF-16 surrogate pair
/// written as two escapes. `chars` only advances on success.
fn decode_unicode(chars: &mut Chars<'_>) -> Option<char> {
    let unit = peek_hex4(chars)?;

    if (0xD800..0xDC00).contains(&unit) {
        let mut ahead = chars.clone();
        ahead.nth(3);
        if ahead.next() != Some('\\') || ahead.next() != Some('u') {
            return None;
        }
        let low = peek_hex4(&ahead).filter(|low| (0xDC00..0xE000).contains(low))?;
        let decoded = char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))?;
        ahead.nth(3);
        *chars = ahead;
        return Some(decoded);
    }

    let decoded = char::from_u32(unit)?;
    chars.nth(3);
    Some(decoded)
}

fn peek_hex4(chars: &Chars<'_>) -> Option<u32> {
    let hex: String = chars.clone().take(4).collect();
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            ' ' => out.push_str("\\ "),
            '=' | ':' | '#' | '!' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => push_control_escaped(&mut out, c),
        }
    }
    out
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            ' ' if i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            _ => push_control_escaped(&mut out, c),
        }
    }
    out
}

fn push_control_escaped(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{c}' => out.push_str("\\f"),
        c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push(c),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_separator_styles() {
        let entries = parse("a=1\nb : 2\nc 3\nd\t=\t4\ne\n");
        assert_eq!(entries["a"], "1");
        assert_eq!(entries["b"], "2");
        assert_eq!(entries["c"], "3");
        assert_eq!(entries["d"], "4");
        assert_eq!(entries["e"], "");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let entries = parse("# comment\n! also comment\n\n   \ngreeting = Hello\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["greeting"], "Hello");
    }

    #[test]
    fn joins_continuation_lines() {
        let entries = parse("long = first \\\n    second \\\n    third\nnext = x\n");
        assert_eq!(entries["long"], "first second third");
        assert_eq!(entries["next"], "x");
    }

    #[test]
    fn even_backslashes_do_not_continue() {
        let entries = parse("path = C:\\\\\nother = y\n");
        assert_eq!(entries["path"], "C:\\");
        assert_eq!(entries["other"], "y");
    }

    #[test]
    fn decodes_escapes() {
        let entries = parse("k = tab\\there\\nnew \\u00e9t\\u00E9 \\q\n");
        assert_eq!(entries["k"], "tab\there\nnew été q");
    }

    #[test]
    fn decodes_surrogate_pairs() {
        let entries = parse("smile = hi \\uD83D\\uDE00\n");
        assert_eq!(entries["smile"], "hi \u{1F600}");
        assert_eq!(write(&entries), "smile = hi \u{1F600}\n");
    }

    #[test]
    fn malformed_unicode_escapes_stay_literal() {
        let entries = parse("a = \\uZZZZ\nb = \\uD83D alone\nc = \\uDE00\nd = \\u12\n");
        assert_eq!(entries["a"], "\\uZZZZ");
        assert_eq!(entries["b"], "\\uD83D alone");
        assert_eq!(entries["c"], "\\uDE00");
        assert_eq!(entries["d"], "\\u12");

        // A save keeps the text readable as the same value.
        assert_eq!(parse(&write(&entries)), entries);
    }

    #[test]
    fn escaped_separators_stay_in_key() {
        let entries = parse("a\\=b\\ c = value\n");
        assert_eq!(entries["a=b c"], "value");
    }

    #[test]
    fn later_duplicates_win() {
        let entries = parse("k = one\nk = two\n");
        assert_eq!(entries["k"], "two");
    }

    #[test]
    fn write_escapes_and_reads_back() {
        let mut entries = BTreeMap::new();
        entries.insert("weird key=1".to_string(), " leading\nand\\slash".to_string());
        entries.insert("plain".to_string(), "Grüße, <b>ok</b>".to_string());

        let text = write(&entries);
        assert!(text.contains("plain = Grüße, <b>ok</b>\n"));
        assert!(text.contains("weird\\ key\\=1 = \\ leading\\nand\\\\slash\n"));
        assert_eq!(parse(&text), entries);
    }

    #[test]
    fn write_orders_keys() {
        let mut entries = BTreeMap::new();
        entries.insert("b".to_string(), "2".to_string());
        entries.insert("a".to_string(), "1".to_string());
        assert_eq!(write(&entries), "a = 1\nb = 2\n");
    }
}
