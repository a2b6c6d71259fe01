//! Value classification and escaping for pre-stringified fields
//!
//! Extra fields reach the logger as plain strings with no type information.
//! A value that already is JSON (object, array, number) or a `<x, y, z>`
//! vector literal is embedded verbatim; everything else becomes an escaped
//! JSON string.

use std::borrow::Cow;

/// How a field value is embedded into a JSON line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonValue<'a> {
    /// Already valid JSON, written as is.
    Raw(Cow<'a, str>),
    /// Plain text, written as an escaped string literal.
    String(&'a str),
}

impl JsonValue<'_> {
    /// Check whether the value is embedded verbatim.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Append the JSON form of this value to `out`.
    pub fn write_to(&self, out: &mut String) {
        match self {
            Self::Raw(raw) => out.push_str(raw),
            Self::String(text) => {
                out.push('"');
                out.push_str(&escape(text));
                out.push('"');
            },
        }
    }
}

/// Classify a value as raw JSON or plain text.
///
/// Surrounding whitespace is always trimmed. Vector literals with three
/// numeric components are rewritten into a JSON array.
pub fn classify(value: &str) -> JsonValue<'_> {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    let (Some(&first), Some(&last)) = (bytes.first(), bytes.last()) else {
        return JsonValue::String(trimmed);
    };

    if bytes.len() >= 2 && ((first == b'[' && last == b']') || (first == b'{' && last == b'}')) {
        return JsonValue::Raw(Cow::Borrowed(trimmed));
    }

    if bytes.len() >= 2 && first == b'<' && last == b'>' {
        return match vector_components(&trimmed[1..trimmed.len() - 1]) {
            Some([x, y, z]) => JsonValue::Raw(Cow::Owned(format!("[{},{},{}]", x, y, z))),
            None => JsonValue::String(trimmed),
        };
    }

    if is_number(trimmed) {
        JsonValue::Raw(Cow::Borrowed(trimmed))
    } else {
        JsonValue::String(trimmed)
    }
}

/// Split `x, y, z` (commas and/or spaces) into three numeric tokens.
fn vector_components(inner: &str) -> Option<[&str; 3]> {
    let mut tokens = inner
        .split([',', ' '])
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let components = [tokens.next()?, tokens.next()?, tokens.next()?];
    if tokens.next().is_some() || !components.iter().all(|token| is_number(token)) {
        return None;
    }
    Some(components)
}

/// Check whether `input` is a numeric literal.
///
/// Accepts an optional leading `-` (but not `+`) that must be followed by a
/// digit, at most one fractional part and at most one exponent with an
/// optional sign. A bare leading `.` (`.5`) and leading zeros are accepted.
pub fn is_number(input: &str) -> bool {
    let bytes = input.as_bytes();
    let mut index = 0;

    if bytes.first() == Some(&b'-') {
        index = 1;
        if !bytes.get(index).is_some_and(u8::is_ascii_digit) {
            return false;
        }
    }

    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut need_digit_after_dot = false;

    while index < bytes.len() {
        match bytes[index] {
            b'0'..=b'9' => {
                seen_digit = true;
                need_digit_after_dot = false;
            },
            b'.' => {
                if seen_dot || seen_exp {
                    return false;
                }
                seen_dot = true;
                need_digit_after_dot = true;
            },
            b'e' | b'E' => {
                if seen_exp || !seen_digit {
                    return false;
                }
                seen_exp = true;
                // the exponent needs digits of its own
                seen_digit = false;
                if matches!(bytes.get(index + 1), Some(b'+' | b'-')) {
                    index += 1;
                }
            },
            _ => return false,
        }
        index += 1;
    }

    seen_digit && !need_digit_after_dot
}

/// Escape text for use inside a JSON string literal.
///
/// Quotes are not added. Text without quotes, backslashes, newlines,
/// carriage returns or tabs is returned untouched; otherwise other control
/// characters are replaced with a space.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['"', '\\', '\n', '\r', '\t']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push(' '),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
