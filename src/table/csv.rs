//! Minimal reader for two-column mapping files.
//!
//! Only what mapping tables need: comma separated, optional double quotes
//! with `""` escapes. A record ends at the end of its line unless a quoted
//! field is still open, in which case it continues on the next line.
use smallvec::SmallVec;
use std::borrow::Cow;

pub(crate) type Record = SmallVec<[String; 2]>;

const BOM: char = '\u{FEFF}';

/// Yields `(line_number, fields)` for every record, numbered by the 1-based
/// line it starts on. Blank lines between records are skipped. An
/// unterminated quote runs to the end of the text and fails there.
pub(crate) fn records(text: &str) -> impl Iterator<Item = (usize, Result<Record, String>)> + '_ {
    let mut lines = text.strip_prefix(BOM).unwrap_or(text).lines().enumerate();
    std::iter::from_fn(move || {
        let (i, first) = lines.by_ref().find(|(_, line)| !line.trim().is_empty())?;
        let mut record = Cow::Borrowed(first);
        let mut parsed = parse_record(&record);
        while parsed.is_err() {
            let Some((_, next)) = lines.next() else {
                break;
            };
            let joined = record.to_mut();
            joined.push('\n');
            joined.push_str(next);
            parsed = parse_record(&record);
        }
        Some((i + 1, parsed))
    })
}

/// Splits one record into fields.
pub(crate) fn parse_record(line: &str) -> Result<Record, String> {
    let mut fields = Record::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;
    // whether the current field opened with a quote
    let mut was_quoted = false;

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => quoted = false,
            ('"', false) if field.is_empty() && !was_quoted => {
                quoted = true;
                was_quoted = true;
            }
            (',', false) => {
                fields.push(std::mem::take(&mut field));
                was_quoted = false;
            }
            _ => field.push(c),
        }
    }
    if quoted {
        return Err("unterminated quoted field".into());
    }
    fields.push(field);
    Ok(fields)
}
