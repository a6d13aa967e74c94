//! Reading and writing LDIF content records (RFC 2849).
//!
//! Only the subset `slapcat` produces is accepted: plain, folded and base64
//! values, comments and an optional `version: 1` header. Change records are
//! read as ordinary attributes and URL references (`attr:< file://...`) are
//! rejected.

use crate::domain::model::{Attributes, Dataset, LdifEntry};
use crate::utils::error::{Result, SimpError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const MAX_LINE_WIDTH: usize = 76;

/// Attributes that are always written base64 encoded.
const ALWAYS_ENCODED: &[&str] = &["userpassword"];

struct LogicalLine {
    number: usize,
    text: String,
}

/// Parses LDIF text into a [`Dataset`].
pub fn parse(text: &str) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    let mut record: Vec<LogicalLine> = Vec::new();
    let mut in_comment = false;
    let mut first_record = true;

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if line.trim().is_empty() {
            in_comment = false;
            if !record.is_empty() {
                if let Some(entry) = parse_record(std::mem::take(&mut record), first_record)? {
                    dataset.insert(entry);
                }
                first_record = false;
            }
            continue;
        }

        if let Some(continued) = line.strip_prefix(' ') {
            if in_comment {
                continue;
            }
            match record.last_mut() {
                Some(last) => last.text.push_str(continued),
                None => {
                    return Err(parse_error(
                        number,
                        "continuation line without a preceding attribute",
                    ))
                }
            }
            continue;
        }

        if line.starts_with('#') {
            in_comment = true;
            continue;
        }

        in_comment = false;
        record.push(LogicalLine {
            number,
            text: line.to_string(),
        });
    }

    if !record.is_empty() {
        if let Some(entry) = parse_record(record, first_record)? {
            dataset.insert(entry);
        }
    }

    tracing::debug!("Parsed {} LDIF entries", dataset.len());
    Ok(dataset)
}

fn parse_record(lines: Vec<LogicalLine>, first_record: bool) -> Result<Option<LdifEntry>> {
    let mut lines = lines.into_iter().peekable();

    if first_record {
        if let Some(first) = lines.peek() {
            let (name, value) = split_line(first)?;
            if name.eq_ignore_ascii_case("version") {
                if value.trim() != "1" {
                    return Err(parse_error(
                        first.number,
                        format!("unsupported LDIF version '{}'", value.trim()),
                    ));
                }
                lines.next();
            }
        }
    }

    let Some(dn_line) = lines.next() else {
        return Ok(None);
    };
    let (name, dn) = split_line(&dn_line)?;
    if !name.eq_ignore_ascii_case("dn") {
        return Err(parse_error(
            dn_line.number,
            format!("expected 'dn:' to start the record, found '{}'", name),
        ));
    }
    let dn = dn.trim().to_string();
    if dn.is_empty() {
        return Err(parse_error(dn_line.number, "empty dn"));
    }

    let mut attributes = Attributes::new();
    for line in lines {
        let (name, value) = split_line(&line)?;
        if name.eq_ignore_ascii_case("dn") {
            return Err(parse_error(
                line.number,
                format!("second dn in the record for '{}'", dn),
            ));
        }
        attributes.push(&name, value);
    }

    if attributes.get("objectclass").map_or(true, |v| v.is_empty()) {
        return Err(parse_error(
            dn_line.number,
            format!("entry '{}' has no objectClass", dn),
        ));
    }

    Ok(Some(LdifEntry::new(dn, attributes)))
}

fn split_line(line: &LogicalLine) -> Result<(String, String)> {
    let Some((name, rest)) = line.text.split_once(':') else {
        return Err(parse_error(
            line.number,
            format!("missing ':' separator in '{}'", line.text),
        ));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(parse_error(line.number, "empty attribute name"));
    }

    let value = if let Some(encoded) = rest.strip_prefix(':') {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| parse_error(line.number, format!("invalid base64 value: {}", e)))?;
        String::from_utf8(bytes).map_err(|_| {
            parse_error(
                line.number,
                format!("base64 value of '{}' is not UTF-8 text", name),
            )
        })?
    } else if rest.starts_with('<') {
        return Err(parse_error(
            line.number,
            format!("URL values are not supported ('{}')", name),
        ));
    } else {
        rest.trim_start_matches(' ').to_string()
    };

    Ok((name.to_string(), value))
}

fn parse_error(line: usize, message: impl Into<String>) -> SimpError {
    SimpError::LdifParseError {
        line,
        message: message.into(),
    }
}

/// Serializes a dataset: entries sorted by DN, attributes sorted by name,
/// records separated by a blank line.
pub fn to_ldif(dataset: &Dataset) -> String {
    let mut entries: Vec<&LdifEntry> = dataset.iter().collect();
    entries.sort_by(|a, b| a.dn.cmp(&b.dn));

    let mut out = String::new();
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        write_value(&mut out, "dn", &entry.dn);
        for (name, values) in entry.attributes.iter() {
            for value in values {
                write_value(&mut out, name, value);
            }
        }
    }
    out
}

fn write_value(out: &mut String, name: &str, value: &str) {
    if ALWAYS_ENCODED.contains(&name) || !is_safe_string(value) {
        let line = format!("{}:: {}", name, STANDARD.encode(value.as_bytes()));
        write_folded(out, &line);
    } else {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
}

/// Base64 lines are pure ASCII, so byte offsets are char offsets.
fn write_folded(out: &mut String, line: &str) {
    let (head, mut rest) = line.split_at(line.len().min(MAX_LINE_WIDTH));
    out.push_str(head);
    out.push('\n');
    while !rest.is_empty() {
        let (chunk, tail) = rest.split_at(rest.len().min(MAX_LINE_WIDTH - 1));
        out.push(' ');
        out.push_str(chunk);
        out.push('\n');
        rest = tail;
    }
}

fn is_safe_string(value: &str) -> bool {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (None, _) => true,
        (Some(b' ' | b':' | b'<'), _) | (_, Some(b' ')) => false,
        _ => bytes.iter().all(|b| (0x20..=0x7e).contains(b)),
    }
}
