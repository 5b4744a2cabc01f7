//! Per-country aggregation of visitor records.

use crate::normalize::normalize;
use crate::record::VisitorRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Counts per category, kept in first-seen order so that ties resolve to
/// whichever value appeared first in the dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Histogram {
    entries: Vec<(String, u32)>,
}

impl Histogram {
    pub fn add(&mut self, key: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, n)) => *n += 1,
            None => self.entries.push((key.to_string(), 1)),
        }
    }

    pub fn get(&self, key: &str) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, n)| *n)
    }

    /// Most frequent key; the earliest seen wins a tie.
    pub fn top(&self) -> Option<&str> {
        let mut best: Option<&(String, u32)> = None;
        for entry in &self.entries {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(k, _)| k.as_str())
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

/// Summary statistics for one canonical country.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CountryAggregate {
    pub count: u32,
    pub total_spend: f64,
    pub total_nights: u64,
    /// Records that contributed to `total_spend`.
    pub spend_count: u32,
    /// Records that contributed to `total_nights`.
    pub nights_count: u32,
    pub visits_thousands: f64,
    pub purposes: Histogram,
    pub modes: Histogram,
}

impl CountryAggregate {
    fn add(&mut self, record: &VisitorRecord) {
        self.count += 1;
        if let Some(amount) = record.spend_amount() {
            self.total_spend += amount;
            self.spend_count += 1;
        }
        if let Some(nights) = record.stay_nights {
            self.total_nights += u64::from(nights);
            self.nights_count += 1;
        }
        if let Some(visits) = record.visits_thousands {
            self.visits_thousands += visits;
        }
        if let Some(purpose) = &record.purpose {
            self.purposes.add(purpose);
        }
        if let Some(mode) = &record.mode {
            self.modes.add(mode);
        }
    }

    /// Mean spend over the records that reported spend.
    pub fn average_spend(&self) -> Option<f64> {
        (self.spend_count > 0).then(|| self.total_spend / self.spend_count as f64)
    }

    /// Total spend spread over every record, reported or not.
    pub fn average_spend_per_visitor_all(&self) -> Option<f64> {
        (self.count > 0 && self.total_spend > 0.0).then(|| self.total_spend / self.count as f64)
    }

    /// Mean stay length over the records that reported nights.
    pub fn average_stay(&self) -> Option<f64> {
        (self.nights_count > 0).then(|| self.total_nights as f64 / self.nights_count as f64)
    }

    pub fn average_nightly_spend(&self) -> Option<f64> {
        (self.total_nights > 0).then(|| self.total_spend / self.total_nights as f64)
    }

    pub fn main_purpose(&self) -> Option<&str> {
        self.purposes.top()
    }

    pub fn main_mode(&self) -> Option<&str> {
        self.modes.top()
    }
}

/// Group records by canonical country name.
///
/// Records with an empty market are ignored. The result is rebuilt from
/// scratch on every call.
pub fn aggregate(records: &[VisitorRecord]) -> BTreeMap<String, CountryAggregate> {
    let mut by_country: BTreeMap<String, CountryAggregate> = BTreeMap::new();
    for record in records {
        if record.market.trim().is_empty() {
            continue;
        }
        by_country
            .entry(normalize(&record.market))
            .or_default()
            .add(record);
    }
    debug!(countries = by_country.len(), records = records.len(), "aggregated");
    by_country
}
