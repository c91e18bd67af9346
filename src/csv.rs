//! Minimal CSV reading and writing.
//!
//! Fields containing a comma, quote, CR or LF are wrapped in double quotes with
//! embedded quotes doubled. Quoted fields may span lines, which matters for
//! action-plan history.

/// Quote a field if needed.
pub fn escape_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Join fields into one record, without the line terminator.
pub fn write_record<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|c| escape_field(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse CSV text into records.
///
/// Handles quoted fields with doubled quotes and embedded newlines, and both
/// LF and CRLF terminators. Blank lines between records are skipped.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' => {
                in_quotes = true;
                field_started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                field_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if field_started || !field.is_empty() || !record.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                field_started = false;
            }
            _ => {
                field.push(ch);
                field_started = true;
            }
        }
    }
    if field_started || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
