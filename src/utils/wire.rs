//! Field escaping shared by the token stream and the AST encoding.
//!
//! Both formats are space separated, one record per line, so literal text
//! must never contain a raw space or line break once written out.

/// Escape a payload field so it survives space splitting.
pub fn escape_field(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' => out.push_str("\\s"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_field`].
pub fn unescape_field(field: &str) -> Result<String, String> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => return Err(format!("unknown escape \\{} in {:?}", other, field)),
            None => return Err(format!("dangling escape in {:?}", field)),
        }
    }
    Ok(out)
}

/// Split a record into its fields. Empty fields are kept.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(' ').collect()
}
