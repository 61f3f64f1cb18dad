use std::collections::HashSet;

use crate::{MlErr, Result};

/// A CSV document split into header and raw string cells.
#[derive(Debug)]
pub(super) struct RawCsv {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parses comma separated text whose first non-empty line is the header.
///
/// Fields may be wrapped in double quotes (a doubled quote escapes one), quoted fields can't
/// span lines. Blank lines are skipped.
///
/// # Arguments
/// * `content` - The whole CSV document.
///
/// # Returns
/// The header and the rows, or an error naming the offending line.
pub(super) fn parse(content: &str) -> Result<RawCsv> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((header_line, header)) = lines.next() else {
        return Err(MlErr::EmptyDataset);
    };

    let header = split_record(header, header_line)?;
    let mut seen = HashSet::with_capacity(header.len());
    for name in &header {
        if name.is_empty() {
            return Err(MlErr::Csv {
                line: header_line,
                msg: "empty column name".into(),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(MlErr::Csv {
                line: header_line,
                msg: format!("duplicated column {name}"),
            });
        }
    }

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let cells = split_record(line, line_no)?;
        if cells.len() != header.len() {
            return Err(MlErr::Csv {
                line: line_no,
                msg: format!("expected {} fields, got {}", header.len(), cells.len()),
            });
        }
        rows.push(cells);
    }

    Ok(RawCsv { header, rows })
}

fn split_record(line: &str, line_no: usize) -> Result<Vec<String>> {
    let mut cells = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let mut cell = String::new();

        // Leading whitespace before an opening quote is not part of the field.
        while chars.peek().is_some_and(|c| *c == ' ' || *c == '\t') {
            chars.next();
        }

        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        cell.push('"');
                    }
                    Some('"') => break,
                    Some(c) => cell.push(c),
                    None => {
                        return Err(MlErr::Csv {
                            line: line_no,
                            msg: "unterminated quoted field".into(),
                        });
                    }
                }
            }
            while chars.peek().is_some_and(|c| *c != ',') {
                chars.next();
            }
        } else {
            while let Some(c) = chars.peek().copied() {
                if c == ',' {
                    break;
                }
                cell.push(c);
                chars.next();
            }
        }

        cells.push(cell.trim().to_string());

        match chars.next() {
            Some(_) => continue,
            None => break,
        }
    }

    Ok(cells)
}
