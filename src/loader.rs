//! Dataset loading
//!
//! Reads the survey CSV (by URL, from disk, or from memory) and turns each
//! usable row into a [`VisitorRecord`]. Column names for spend and nights
//! drift between data revisions, so they are matched by substring.

use crate::error::LoadError;
use crate::record::{Spend, VisitorRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Public copy of the London international visitors survey.
pub const DEFAULT_DATASET_URL: &str = "https://raw.githubusercontent.com/PhoebeLiuyf/mini-project/main/travel%20data/international-visitors-london-raw.csv";

const VISITS_COLUMN: &str = "Visits (000s)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// Data Source
// ============================================================================

/// Where the raw CSV text comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
    Inline(String),
}

impl DataSource {
    /// Read the raw text. Blocks until the transfer finishes or times out.
    pub fn fetch(&self) -> Result<String, LoadError> {
        match self {
            DataSource::Url(url) => fetch_url(url),
            DataSource::File(path) => Ok(fs::read_to_string(path)?),
            DataSource::Inline(text) => Ok(text.clone()),
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Url(DEFAULT_DATASET_URL.to_string())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Inline(text) => write!(f, "<inline, {} bytes>", text.len()),
        }
    }
}

fn fetch_url(url: &str) -> Result<String, LoadError> {
    debug!(%url, "fetching dataset");
    let response = match ureq::get(url).timeout(FETCH_TIMEOUT).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, _)) => {
            return Err(LoadError::Status { url: url.to_string(), status });
        }
        Err(e) => {
            return Err(LoadError::Http { url: url.to_string(), reason: e.to_string() });
        }
    };
    let body = response.into_string()?;
    debug!(bytes = body.len(), "dataset downloaded");
    Ok(body)
}

/// Fetch and parse in one step.
pub fn load_from(source: &DataSource) -> Result<Vec<VisitorRecord>, LoadError> {
    let text = source.fetch()?;
    load(&text)
}

// ============================================================================
// Parsing
// ============================================================================

/// Column positions resolved from the header row.
struct Columns {
    quarter: Option<usize>,
    market: Option<usize>,
    purpose: Option<usize>,
    mode: Option<usize>,
    dur_stay: Option<usize>,
    visits: Option<usize>,
    spend: Option<usize>,
    nights: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let exact = |name: &str| headers.iter().position(|h| h == name);
        // Later matches win, same as scanning the header row left to right.
        let containing = |needle: &str| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.contains(needle))
                .map(|(i, _)| i)
                .last()
        };

        let columns = Self {
            quarter: exact("quarter"),
            market: exact("market"),
            purpose: exact("purpose"),
            mode: exact("mode"),
            dur_stay: exact("dur_stay"),
            visits: exact(VISITS_COLUMN),
            spend: containing("Spend"),
            nights: containing("Nights"),
        };

        if let Some(i) = columns.spend {
            debug!(field = &headers[i], "spend column detected");
        }
        if let Some(i) = columns.nights {
            debug!(field = &headers[i], "nights column detected");
        }
        columns
    }
}

fn text_field(row: &StringRecord, idx: Option<usize>) -> Option<String> {
    let value = row.get(idx?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn number_field(row: &StringRecord, idx: Option<usize>) -> Option<f64> {
    let value: f64 = row.get(idx?)?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse the CSV text into records.
///
/// Rows missing `quarter` or `market` are dropped. Fails when the text is not
/// valid CSV or when nothing usable remains.
pub fn load(source_text: &str) -> Result<Vec<VisitorRecord>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(source_text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers);

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|f| f.is_empty()) {
            continue;
        }
        match parse_row(&row, &columns) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    debug!(records = records.len(), dropped, "dataset parsed");
    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(records)
}

fn parse_row(row: &StringRecord, columns: &Columns) -> Option<VisitorRecord> {
    let quarter = text_field(row, columns.quarter)?;
    let market = text_field(row, columns.market)?;

    let duration_bucket = text_field(row, columns.dur_stay);
    let visits_thousands = number_field(row, columns.visits);
    let visitors = visits_thousands.unwrap_or(0.0) * 1000.0;

    let mut stay_nights = duration_bucket.as_deref().and_then(parse_stay_nights);

    let spend = number_field(row, columns.spend)
        .filter(|millions| *millions >= 0.0)
        .map(|millions| {
            if visitors > 0.0 {
                Spend::PerVisitor(millions * 1_000_000.0 / visitors)
            } else {
                Spend::Total(millions * 1_000_000.0)
            }
        });

    if stay_nights.is_none() && visitors > 0.0 {
        if let Some(nights_thousands) = number_field(row, columns.nights) {
            if nights_thousands >= 0.0 {
                stay_nights = Some((nights_thousands * 1000.0 / visitors).round() as u32);
            }
        }
    }

    Some(VisitorRecord {
        quarter,
        market,
        purpose: text_field(row, columns.purpose),
        mode: text_field(row, columns.mode),
        duration_bucket,
        stay_nights,
        spend,
        visits_thousands,
    })
}

/// Nights from a duration bucket such as `"4-7 nights"` (midpoint, rounded
/// down) or `"10"` (exact). The first integer, optionally followed by `-`
/// and a second integer, is used; anything else yields `None`.
pub fn parse_stay_nights(bucket: &str) -> Option<u32> {
    let bytes = bucket.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let first_end = digits_end(bytes, start);
    let first: u32 = bucket[start..first_end].parse().ok()?;

    if bytes.get(first_end) == Some(&b'-')
        && bytes.get(first_end + 1).is_some_and(|b| b.is_ascii_digit())
    {
        let second_end = digits_end(bytes, first_end + 1);
        let second: u32 = bucket[first_end + 1..second_end].parse().ok()?;
        return Some(((first as u64 + second as u64) / 2) as u32);
    }
    Some(first)
}

fn digits_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| from + n)
}
