//! CSV text <-> ordered row mappings.
//!
//! # Invariants
//! - `parse_csv` never fails: empty input yields no rows and unreadable
//!   records are skipped with a warning.
//! - `serialize_csv` output starts with a UTF-8 BOM, uses `\n` line endings
//!   and quotes only fields that need it (RFC 4180 doubling of `"`).

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::string::FromUtf8Error;

/// Byte-order marker prepended to exported files for spreadsheet tools.
pub const UTF8_BOM: char = '\u{feff}';

#[derive(Debug)]
pub enum CsvCodecError {
    /// Serialization was asked for zero columns.
    NoHeaders,
    Csv(csv::Error),
    Flush(String),
    Encoding(FromUtf8Error),
}

impl Display for CsvCodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHeaders => write!(f, "csv output needs at least one column"),
            Self::Csv(err) => write!(f, "csv error: {err}"),
            Self::Flush(message) => write!(f, "failed to flush csv output: {message}"),
            Self::Encoding(err) => write!(f, "csv output is not UTF-8: {err}"),
        }
    }
}

impl Error for CsvCodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Encoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<csv::Error> for CsvCodecError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<FromUtf8Error> for CsvCodecError {
    fn from(value: FromUtf8Error) -> Self {
        Self::Encoding(value)
    }
}

/// One data row: header name -> cell text, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: Vec<(String, String)>,
}

impl CsvRow {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    fn from_record(headers: &[String], record: &StringRecord) -> Self {
        if record.len() > headers.len() {
            debug!(
                "event=csv_parse module=csv status=ok extra_fields={}",
                record.len() - headers.len()
            );
        }
        Self {
            fields: headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    (
                        header.clone(),
                        record.get(index).unwrap_or_default().to_string(),
                    )
                })
                .collect(),
        }
    }

    /// Cell under `header`; first match wins for repeated headers.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value.as_str())
    }

    /// Cell under `header`, or `""` when the column is absent.
    pub fn value(&self, header: &str) -> &str {
        self.get(header).unwrap_or_default()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parses header-led CSV text into row mappings.
///
/// Accepts a BOM at either end of the text, CRLF or LF line endings, quoted
/// fields, and rows shorter than the header (missing cells become `""`).
/// Every header and cell is trimmed.
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let text = text
        .trim_start_matches(UTF8_BOM)
        .trim_end_matches(UTF8_BOM);
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_string).collect(),
        Err(err) => {
            warn!("event=csv_parse module=csv status=error stage=headers error={err}");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) if is_blank_record(text, &record) => continue,
            Ok(record) => rows.push(CsvRow::from_record(&headers, &record)),
            Err(err) => {
                let line = err.position().map_or(0, |position| position.line());
                warn!("event=csv_parse module=csv status=skipped line={line} error={err}");
            }
        }
    }
    rows
}

/// Serializes `headers` and `rows` into BOM-prefixed CSV text.
///
/// Every row must have exactly `headers.len()` values.
pub fn serialize_csv<H, V>(headers: &[H], rows: &[Vec<V>]) -> Result<String, CsvCodecError>
where
    H: AsRef<str>,
    V: AsRef<str>,
{
    if headers.is_empty() {
        return Err(CsvCodecError::NoHeaders);
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(headers.iter().map(|header| header.as_ref()))?;
    for row in rows {
        writer.write_record(row.iter().map(|value| value.as_ref()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| CsvCodecError::Flush(err.to_string()))?;

    let mut text = String::with_capacity(bytes.len() + UTF8_BOM.len_utf8());
    text.push(UTF8_BOM);
    text.push_str(&String::from_utf8(bytes)?);
    Ok(text)
}

/// A whitespace-only line. A lone quoted empty cell (`""`) is a real row.
fn is_blank_record(text: &str, record: &StringRecord) -> bool {
    if record.len() > 1 || !record.get(0).map_or(true, str::is_empty) {
        return false;
    }
    let start = record
        .position()
        .and_then(|position| usize::try_from(position.byte()).ok())
        .unwrap_or_default();
    let line = text
        .get(start..)
        .and_then(|rest| rest.lines().find(|line| !line.is_empty()))
        .unwrap_or_default();
    !line.contains('"')
}
