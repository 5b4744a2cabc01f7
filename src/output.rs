//! File and stdout renderers: GeoJSON, chart JSON and a text summary.

use crate::charts::build_charts;
use crate::features::{arc_features, feature_collection, marker_features};
use crate::geo::country_center;
use crate::session::{RenderOutcome, Renderer, Snapshot, View};
use serde::Serialize;
use std::io::{self, Write};

/// Turn a view into a snapshot, or the load error into an `io::Error`.
fn require_snapshot<'a>(view: View<'a>) -> io::Result<&'a Snapshot> {
    if let Some(err) = view.error {
        return Err(io::Error::other(err.to_string()));
    }
    view.snapshot
        .ok_or_else(|| io::Error::other("no data loaded"))
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    out.flush()
}

/// Writes the arcs and country markers as one `FeatureCollection`.
pub struct GeoJsonWriter<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> GeoJsonWriter<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        Self { out, pretty }
    }
}

impl<W: Write> Renderer for GeoJsonWriter<W> {
    fn present(&mut self, view: View<'_>) -> io::Result<RenderOutcome> {
        let snapshot = require_snapshot(view)?;
        let mut features = arc_features(&snapshot.arcs, &snapshot.aggregates);
        features.extend(marker_features(&snapshot.aggregates, country_center));
        write_json(&mut self.out, &feature_collection(features), self.pretty)?;
        Ok(RenderOutcome::Done)
    }
}

pub struct ChartWriter<W: Write> {
    out: W,
    top: usize,
    pretty: bool,
}

impl<W: Write> ChartWriter<W> {
    pub fn new(out: W, top: usize, pretty: bool) -> Self {
        Self { out, top, pretty }
    }
}

impl<W: Write> Renderer for ChartWriter<W> {
    fn present(&mut self, view: View<'_>) -> io::Result<RenderOutcome> {
        let snapshot = require_snapshot(view)?;
        let charts = build_charts(&snapshot.records, &snapshot.aggregates, self.top);
        write_json(&mut self.out, &charts, self.pretty)?;
        Ok(RenderOutcome::Done)
    }
}

/// Plain-text table of the largest source markets.
pub struct SummaryPrinter<W: Write> {
    out: W,
    top: usize,
}

impl<W: Write> SummaryPrinter<W> {
    pub fn new(out: W, top: usize) -> Self {
        Self { out, top }
    }
}

fn or_dash(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

impl<W: Write> Renderer for SummaryPrinter<W> {
    fn present(&mut self, view: View<'_>) -> io::Result<RenderOutcome> {
        let snapshot = require_snapshot(view)?;
        let out = &mut self.out;

        writeln!(
            out,
            "{} records, {} countries, {} arcs",
            snapshot.records.len(),
            snapshot.aggregates.len(),
            snapshot.arcs.len()
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "{:<22} {:>7} {:>6} {:>10} {:>7}  {:<16} {}",
            "country", "records", "lines", "avg spend", "nights", "purpose", "mode"
        )?;

        for country in snapshot.ranked_countries().into_iter().take(self.top) {
            let Some(agg) = snapshot.aggregates.get(country) else {
                continue;
            };
            let lines = snapshot.line_counts.get(country).copied().unwrap_or(0);
            writeln!(
                out,
                "{:<22} {:>7} {:>6} {:>10} {:>7}  {:<16} {}",
                country,
                agg.count,
                lines,
                or_dash(agg.average_spend(), 2),
                or_dash(agg.average_stay(), 1),
                agg.main_purpose().unwrap_or("-"),
                agg.main_mode().unwrap_or("-"),
            )?;
        }
        out.flush()?;
        Ok(RenderOutcome::Done)
    }
}
