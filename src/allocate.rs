//! Arc budget per country
//!
//! Visitor share maps to a number of rendered arcs through a log-compressed
//! curve so the largest source market cannot drown out the small ones.

use crate::aggregate::CountryAggregate;
use crate::geo::LonLat;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineBudget {
    /// Nominal number of arcs shared out by visitor share.
    pub max_total_lines: u32,
    /// Hard cap for any single country.
    pub max_lines_per_country: u32,
}

impl Default for LineBudget {
    fn default() -> Self {
        Self {
            max_total_lines: 500,
            max_lines_per_country: 120,
        }
    }
}

/// Arcs for one country given its share of all placeable visitors.
pub fn lines_for_share(share: f64, budget: LineBudget) -> u32 {
    let raw = (share * budget.max_total_lines as f64).round().max(1.0);
    let compressed = (raw * 0.5 + raw.log10() * 5.0).ceil();
    let cap = budget.max_lines_per_country.max(1);
    (compressed as u32).clamp(1, cap)
}

/// Number of arcs to draw for each country that has map coordinates.
///
/// Countries `locate` cannot place are left out (and logged).
pub fn allocate_line_counts<F>(
    aggregates: &BTreeMap<String, CountryAggregate>,
    budget: LineBudget,
    locate: F,
) -> BTreeMap<String, u32>
where
    F: Fn(&str) -> Option<LonLat>,
{
    let placeable: Vec<(&String, &CountryAggregate)> = aggregates
        .iter()
        .filter(|(country, _)| {
            let known = locate(country).is_some();
            if !known {
                warn!(country = country.as_str(), "no map coordinates, skipping");
            }
            known
        })
        .collect();

    let total: u64 = placeable.iter().map(|(_, agg)| u64::from(agg.count)).sum();
    if total == 0 {
        return BTreeMap::new();
    }

    placeable
        .into_iter()
        .map(|(country, agg)| {
            let share = agg.count as f64 / total as f64;
            (country.clone(), lines_for_share(share, budget))
        })
        .collect()
}
