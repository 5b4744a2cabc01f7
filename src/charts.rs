//! Chart-ready summaries: country ranking, stay duration and spending by
//! continent.

use crate::aggregate::CountryAggregate;
use crate::geo::{continent_of, Continent};
use crate::normalize::normalize;
use crate::record::VisitorRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Stay buckets shown on the duration chart. Longer stays are left out.
pub const STAY_BUCKETS: [(&str, u32, u32); 4] = [
    ("1-3 days", 1, 3),
    ("4-7 days", 4, 7),
    ("8-14 days", 8, 14),
    ("15-28 days", 15, 28),
];

/// Lightest first: the continent with the most visitors gets the lightest bar.
pub const CONTINENT_RAMP: [&str; 6] = ["#c2c0e0", "#b0aed7", "#9e9cce", "#8a88b3", "#78769c", "#656387"];

/// What a ranking value counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBasis {
    /// Surveyed visits, in thousands.
    Visits,
    /// Survey records, for countries with no visits column data.
    Records,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankEntry {
    pub name: String,
    pub value: u64,
    pub basis: RankBasis,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContinentSeries {
    pub continent: &'static str,
    pub color: &'static str,
    /// One count per entry of `STAY_BUCKETS`.
    pub counts: [u32; 4],
    pub total: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StayDurationChart {
    pub buckets: Vec<&'static str>,
    /// Stacking order, largest continent first.
    pub series: Vec<ContinentSeries>,
    pub bucket_totals: [u32; 4],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinentSpending {
    pub continent: &'static str,
    pub avg_total_spend: i64,
    pub avg_daily_spend: i64,
    pub visit_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Charts {
    pub ranking: Vec<RankEntry>,
    pub stay_duration: StayDurationChart,
    pub spending: Vec<ContinentSpending>,
}

/// Top `top_n` countries by summed visits (thousands, rounded). Countries
/// without any visits data are ranked by record count after all measured
/// ones, since the two values are not comparable.
pub fn country_ranking(aggregates: &BTreeMap<String, CountryAggregate>, top_n: usize) -> Vec<RankEntry> {
    let mut ranked: Vec<RankEntry> = aggregates
        .iter()
        .map(|(name, agg)| {
            let (value, basis) = if agg.visits_thousands > 0.0 {
                (agg.visits_thousands.round() as u64, RankBasis::Visits)
            } else {
                (u64::from(agg.count), RankBasis::Records)
            };
            RankEntry { name: name.clone(), value, basis }
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.basis
            .cmp(&b.basis)
            .then(b.value.cmp(&a.value))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(top_n);
    ranked
}

fn stay_bucket(nights: u32) -> Option<usize> {
    STAY_BUCKETS
        .iter()
        .position(|(_, lo, hi)| (*lo..=*hi).contains(&nights))
}

fn record_continent(record: &VisitorRecord) -> Option<Continent> {
    if record.market.trim().is_empty() {
        return None;
    }
    continent_of(&normalize(&record.market))
}

pub fn stay_duration_chart(records: &[VisitorRecord]) -> StayDurationChart {
    let mut counts: BTreeMap<Continent, [u32; 4]> = Continent::ALL.iter().map(|c| (*c, [0; 4])).collect();

    for record in records {
        let (Some(continent), Some(nights)) = (record_continent(record), record.stay_nights) else {
            continue;
        };
        if let (Some(bucket), Some(row)) = (stay_bucket(nights), counts.get_mut(&continent)) {
            row[bucket] += 1;
        }
    }

    // Stable sort keeps the declaration order for equal totals.
    let mut order: Vec<Continent> = Continent::ALL.to_vec();
    let total_of = |c: &Continent| counts.get(c).map_or(0, |row| row.iter().sum::<u32>());
    order.sort_by_key(|c| std::cmp::Reverse(total_of(c)));

    let mut bucket_totals = [0u32; 4];
    let series = order
        .iter()
        .enumerate()
        .map(|(rank, continent)| {
            let row = counts.get(continent).copied().unwrap_or_default();
            for (total, n) in bucket_totals.iter_mut().zip(row) {
                *total += n;
            }
            ContinentSeries {
                continent: continent.name(),
                color: CONTINENT_RAMP[rank.min(CONTINENT_RAMP.len() - 1)],
                counts: row,
                total: row.iter().sum(),
            }
        })
        .collect();

    StayDurationChart {
        buckets: STAY_BUCKETS.iter().map(|(label, _, _)| *label).collect(),
        series,
        bucket_totals,
    }
}

#[derive(Default)]
struct SpendTally {
    spend: f64,
    nights: u64,
    visits: u32,
}

pub fn spending_chart(records: &[VisitorRecord]) -> Vec<ContinentSpending> {
    let mut tallies: BTreeMap<Continent, SpendTally> = BTreeMap::new();
    for record in records {
        let Some(continent) = record_continent(record) else {
            continue;
        };
        let tally = tallies.entry(continent).or_default();
        tally.visits += 1;
        if let Some(amount) = record.spend_amount() {
            tally.spend += amount;
        }
        if let Some(nights) = record.stay_nights {
            tally.nights += u64::from(nights);
        }
    }

    Continent::ALL
        .iter()
        .filter_map(|continent| {
            let tally = tallies.get(continent)?;
            let daily = if tally.nights > 0 { tally.spend / tally.nights as f64 } else { 0.0 };
            Some(ContinentSpending {
                continent: continent.name(),
                avg_total_spend: (tally.spend / f64::from(tally.visits)).round() as i64,
                avg_daily_spend: daily.round() as i64,
                visit_count: tally.visits,
            })
        })
        .collect()
}

pub fn build_charts(
    records: &[VisitorRecord],
    aggregates: &BTreeMap<String, CountryAggregate>,
    top_n: usize,
) -> Charts {
    Charts {
        ranking: country_ranking(aggregates, top_n),
        stay_duration: stay_duration_chart(records),
        spending: spending_chart(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::record::Spend;

    fn stay(market: &str, nights: Option<u32>) -> VisitorRecord {
        let mut r = VisitorRecord::new("Q1", market);
        r.stay_nights = nights;
        r
    }

    #[test]
    fn bucket_edges() {
        assert_eq!(stay_bucket(0), None);
        assert_eq!(stay_bucket(1), Some(0));
        assert_eq!(stay_bucket(3), Some(0));
        assert_eq!(stay_bucket(4), Some(1));
        assert_eq!(stay_bucket(14), Some(2));
        assert_eq!(stay_bucket(28), Some(3));
        assert_eq!(stay_bucket(29), None);
    }

    #[test]
    fn duration_chart_orders_by_total() {
        let records = vec![
            stay("France", Some(2)),
            stay("GERMANY", Some(5)),
            stay("Spain", Some(30)),
            stay("USA", Some(10)),
            stay("Narnia", Some(2)),
            stay("Japan", None),
        ];
        let chart = stay_duration_chart(&records);

        assert_eq!(chart.buckets, vec!["1-3 days", "4-7 days", "8-14 days", "15-28 days"]);
        assert_eq!(chart.series.len(), 6);
        let europe = &chart.series[0];
        assert_eq!(europe.continent, "Europe");
        assert_eq!(europe.color, "#c2c0e0");
        assert_eq!(europe.counts, [1, 1, 0, 0]);
        assert_eq!(chart.series[1].continent, "North America");
        assert_eq!(chart.series[5].color, "#656387");
        assert_eq!(chart.bucket_totals, [1, 1, 1, 0]);
    }

    #[test]
    fn spending_chart_averages() {
        let mut a = stay("Japan", Some(4));
        a.spend = Some(Spend::PerVisitor(1000.0));
        let mut b = stay("China", None);
        b.spend = Some(Spend::PerVisitor(501.0));
        let c = stay("India", Some(6));

        let chart = spending_chart(&[a, b, c, stay("Narnia", Some(3))]);
        assert_eq!(chart.len(), 1);
        let asia = &chart[0];
        assert_eq!(asia.continent, "Asia");
        assert_eq!(asia.visit_count, 3);
        assert_eq!(asia.avg_total_spend, 500);
        assert_eq!(asia.avg_daily_spend, 150);
    }

    #[test]
    fn spending_without_nights_has_zero_daily() {
        let mut a = stay("Brazil", None);
        a.spend = Some(Spend::Total(2_000_000.0));
        let chart = spending_chart(&[a]);
        assert_eq!(chart[0].avg_daily_spend, 0);
        assert_eq!(chart[0].avg_total_spend, 2_000_000);
    }

    #[test]
    fn ranking_prefers_visits_then_counts() {
        let mut a = stay("France", None);
        a.visits_thousands = Some(120.4);
        let mut b = stay("USA", None);
        b.visits_thousands = Some(300.6);
        let c = stay("Peru", None);
        let aggs = aggregate(&[a, b, c]);

        let ranking = country_ranking(&aggs, 10);
        assert_eq!(
            ranking,
            vec![
                RankEntry { name: "USA".into(), value: 301, basis: RankBasis::Visits },
                RankEntry { name: "France".into(), value: 120, basis: RankBasis::Visits },
                RankEntry { name: "Peru".into(), value: 1, basis: RankBasis::Records },
            ]
        );
        assert_eq!(country_ranking(&aggs, 1).len(), 1);
    }

    #[test]
    fn record_counts_never_outrank_measured_visits() {
        let mut measured = stay("Malta", None);
        measured.visits_thousands = Some(0.6);
        let unmeasured: Vec<VisitorRecord> = (0..50).map(|_| stay("Peru", None)).collect();
        let mut records = vec![measured];
        records.extend(unmeasured);
        let aggs = aggregate(&records);

        let ranking = country_ranking(&aggs, 10);
        assert_eq!(ranking[0].name, "Malta");
        assert_eq!(ranking[0].basis, RankBasis::Visits);
        assert_eq!(ranking[1].name, "Peru");
        assert_eq!(ranking[1].value, 50);
        assert_eq!(ranking[1].basis, RankBasis::Records);

        let json = serde_json::to_value(&ranking[1]).unwrap();
        assert_eq!(json["basis"], "records");
    }
}
