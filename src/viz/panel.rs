//! Side panel with the chart data drawn as text bars.

use crate::colors;
use crate::terminal::Terminal;
use visitflow::charts::{
    country_ranking, spending_chart, stay_duration_chart, ContinentSpending, RankBasis, RankEntry,
    StayDurationChart,
};
use visitflow::Snapshot;

pub const PANEL_WIDTH: u16 = 36;
const TOP_MARKETS: usize = 10;
const NAME_WIDTH: usize = 14;

/// Chart data derived once per snapshot.
#[derive(Clone, Debug)]
pub struct PanelData {
    pub ranking: Vec<RankEntry>,
    pub stay: StayDurationChart,
    pub spending: Vec<ContinentSpending>,
}

impl PanelData {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            ranking: country_ranking(&snapshot.aggregates, TOP_MARKETS),
            stay: stay_duration_chart(&snapshot.records),
            spending: spending_chart(&snapshot.records),
        }
    }
}

fn truncate(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}

/// Bar length in cells for `value` out of `max`.
fn bar_len(value: u64, max: u64, width: usize) -> usize {
    if max == 0 {
        return 0;
    }
    ((value as f64 / max as f64) * width as f64).round() as usize
}

/// Draw the panel with its left edge at column `x0`. Returns the last row used.
pub fn draw(term: &mut Terminal, x0: i32, data: &PanelData) -> i32 {
    let bar_width = (PANEL_WIDTH as usize).saturating_sub(NAME_WIDTH + 8);
    let mut y = 1;

    term.set_str(x0, y, "TOP SOURCE MARKETS", Some(colors::PANEL_TITLE), true);
    y += 1;
    // Bars only compare entries of the same basis.
    let max_of = |basis: RankBasis| {
        data.ranking.iter().filter(|e| e.basis == basis).map(|e| e.value).max().unwrap_or(0)
    };
    for entry in &data.ranking {
        term.set_str(x0, y, &truncate(&entry.name, NAME_WIDTH), Some(colors::PANEL_TEXT), false);
        let len = bar_len(entry.value, max_of(entry.basis), bar_width);
        term.set_str(x0 + NAME_WIDTH as i32 + 1, y, &"▇".repeat(len), colors::hex("#8a88b3"), false);
        let label = match entry.basis {
            RankBasis::Visits => format!("{}k", entry.value),
            RankBasis::Records => format!("{} rec", entry.value),
        };
        term.set_str(x0 + (NAME_WIDTH + 2 + len) as i32, y, &label, Some(colors::PANEL_DIM), false);
        y += 1;
    }

    y += 1;
    term.set_str(x0, y, "LENGTH OF STAY", Some(colors::PANEL_TITLE), true);
    y += 1;
    let max_bucket = data.stay.bucket_totals.iter().copied().max().unwrap_or(0);
    for (i, bucket) in data.stay.buckets.iter().enumerate() {
        term.set_str(x0, y, bucket, Some(colors::PANEL_TEXT), false);
        // Stacked segments, largest continent first.
        let mut x = x0 + NAME_WIDTH as i32 + 1;
        let mut drawn = 0u64;
        for series in &data.stay.series {
            drawn += u64::from(series.counts[i]);
            let end = bar_len(drawn, u64::from(max_bucket), bar_width) as i32;
            let start = x - (x0 + NAME_WIDTH as i32 + 1);
            for _ in start..end {
                term.set(x, y, '▇', colors::hex(series.color), false);
                x += 1;
            }
        }
        let total = data.stay.bucket_totals[i].to_string();
        term.set_str(x + 1, y, &total, Some(colors::PANEL_DIM), false);
        y += 1;
    }
    for series in data.stay.series.iter().filter(|s| s.total > 0) {
        term.set(x0, y, '■', colors::hex(series.color), false);
        term.set_str(x0 + 2, y, series.continent, Some(colors::PANEL_DIM), false);
        y += 1;
    }

    y += 1;
    term.set_str(x0, y, "SPEND PER VISIT / PER DAY", Some(colors::PANEL_TITLE), true);
    y += 1;
    for row in &data.spending {
        let line = format!("{:<14}£{:>6} £{:>5}", row.continent, row.avg_total_spend, row.avg_daily_spend);
        term.set_str(x0, y, &line, Some(colors::PANEL_TEXT), false);
        y += 1;
    }
    y
}
