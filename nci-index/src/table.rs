//! Delimited text tables.
//!
//! A small reader/writer for the comma- or tab-separated exports the pipeline
//! consumes. Fields may be quoted with `"`; a doubled quote inside a quoted
//! field is a literal quote. Records are line-based, so the writer folds a
//! line break inside a field into a space.

use serde::{Deserialize, Serialize};

const BOM: char = '\u{feff}';

/// Field delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }

    /// Tab when the header line contains one, comma otherwise.
    pub fn detect(first_line: &str) -> Self {
        if first_line.contains('\t') {
            Self::Tab
        } else {
            Self::Comma
        }
    }
}

fn strip_bom(s: &str) -> &str {
    s.strip_prefix(BOM).unwrap_or(s)
}

/// Split one line into fields.
pub fn parse_line(line: &str, delimiter: Delimiter) -> Vec<String> {
    let delim = delimiter.as_char();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' {
            quoted = true;
        } else if c == delim {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    fields.push(current);
    fields
}

/// Quote a field if it contains the delimiter or a quote.
///
/// Line breaks become single spaces first; a record never spans lines.
pub fn quote_field(field: &str, delimiter: Delimiter) -> String {
    let field = field.replace("\r\n", " ").replace(['\n', '\r'], " ");
    let needs_quotes = field.contains(delimiter.as_char()) || field.contains('"');

    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

/// A parsed table: one header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub delimiter: Delimiter,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(delimiter: Delimiter, headers: Vec<String>) -> Self {
        Self {
            delimiter,
            headers,
            rows: Vec::new(),
        }
    }

    /// Parse delimited text. A leading BOM is dropped, `\r\n` becomes `\n`,
    /// and blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");
        let body = strip_bom(&normalized);

        let delimiter = Delimiter::detect(body.lines().next().unwrap_or_default());
        let mut lines = body.lines().filter(|l| !l.trim().is_empty());

        let Some(header_line) = lines.next() else {
            return Self::new(delimiter, Vec::new());
        };

        let headers = parse_line(header_line, delimiter)
            .into_iter()
            .map(|h| strip_bom(h.trim()).to_string())
            .collect();

        let rows = lines.map(|l| parse_line(l, delimiter)).collect();

        Self {
            delimiter,
            headers,
            rows,
        }
    }

    /// Index of the first header matching one of `aliases`, case-insensitively.
    ///
    /// Aliases are tried in order; the first alias with a matching header wins.
    pub fn column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            self.headers
                .iter()
                .position(|h| h.to_lowercase() == alias.to_lowercase())
        })
    }

    /// Cell at `row`/`column`, empty when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Render as delimited text with `\n` line endings.
    pub fn to_text(&self) -> String {
        self.render("\n")
    }

    /// Render with the given line ending after every row, header included.
    pub fn render(&self, line_ending: &str) -> String {
        let separator = self.delimiter.as_char().to_string();
        let mut out = String::new();
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            let line: Vec<String> = row
                .iter()
                .map(|f| quote_field(f, self.delimiter))
                .collect();
            out.push_str(&line.join(separator.as_str()));
            out.push_str(line_ending);
        }
        out
    }
}
