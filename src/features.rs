//! GeoJSON output for the flow map.

use crate::aggregate::CountryAggregate;
use crate::flows::ArcPath;
use crate::geo::LonLat;
use serde_json::{json, Value};
use std::collections::BTreeMap;

const UNKNOWN: &str = "Unknown";
const NO_DATA: &str = "No data";

/// Average spend as shown on arcs: two decimals, or "N/A".
fn arc_avg_spending(agg: &CountryAggregate) -> String {
    agg.average_spend_per_visitor_all()
        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

/// One `LineString` feature per arc.
pub fn arc_features(arcs: &[ArcPath], aggregates: &BTreeMap<String, CountryAggregate>) -> Vec<Value> {
    let empty = CountryAggregate::default();
    arcs.iter()
        .map(|arc| {
            let agg = aggregates.get(&arc.country).unwrap_or(&empty);
            json!({
                "type": "Feature",
                "properties": {
                    "country": arc.country,
                    "visitors": agg.count,
                    "lineWidth": arc.width,
                    "opacity": arc.opacity(),
                    "avgSpending": arc_avg_spending(agg),
                    "mainPurpose": agg.main_purpose().unwrap_or(UNKNOWN),
                    "mainMode": agg.main_mode().unwrap_or(UNKNOWN),
                    "lineColor": arc.color.to_string(),
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": arc.points,
                },
            })
        })
        .collect()
}

/// Popup fields for a country marker.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSummary {
    pub main_mode: String,
    pub average_stay: String,
    pub average_daily: String,
    pub average_total: String,
}

impl MarkerSummary {
    pub fn from_aggregate(agg: &CountryAggregate) -> Self {
        let average_stay = agg
            .average_stay()
            .map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.1} days"));

        let average_daily = match agg.average_nightly_spend() {
            Some(v) if agg.total_spend > 0.0 => format!("£{v:.2}"),
            _ => NO_DATA.to_string(),
        };

        let average_total = if let Some(v) = agg.average_spend() {
            format!("£{v:.2}")
        } else if let Some(v) = agg.average_spend_per_visitor_all() {
            format!("£{v:.2} (estimated)")
        } else {
            NO_DATA.to_string()
        };

        Self {
            main_mode: agg.main_mode().unwrap_or(UNKNOWN).to_string(),
            average_stay,
            average_daily,
            average_total,
        }
    }

    pub fn popup_html(&self, country: &str) -> String {
        format!(
            "<h3>{country}</h3>\
             <p>Main travel mode: <b>{}</b></p>\
             <p>Average stay duration: <b>{}</b></p>\
             <p>Average daily spending: <b>{}</b></p>\
             <p>Average total spending: <b>{}</b></p>",
            self.main_mode, self.average_stay, self.average_daily, self.average_total
        )
    }
}

/// One `Point` feature per country that `locate` can place.
pub fn marker_features<F>(aggregates: &BTreeMap<String, CountryAggregate>, locate: F) -> Vec<Value>
where
    F: Fn(&str) -> Option<LonLat>,
{
    aggregates
        .iter()
        .filter_map(|(country, agg)| {
            let position = locate(country)?;
            let summary = MarkerSummary::from_aggregate(agg);
            Some(json!({
                "type": "Feature",
                "properties": {
                    "country": country,
                    "visitors": agg.count,
                    "popup": summary.popup_html(country),
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": position,
                },
            }))
        })
        .collect()
}

pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::Rgb;
    use crate::geo::country_center;

    fn france() -> CountryAggregate {
        let mut agg = CountryAggregate {
            count: 4,
            total_spend: 1200.0,
            total_nights: 10,
            spend_count: 2,
            nights_count: 3,
            ..Default::default()
        };
        agg.modes.add("Air");
        agg.modes.add("Sea");
        agg.modes.add("Air");
        agg
    }

    #[test]
    fn arc_feature_properties() {
        let mut aggs = BTreeMap::new();
        aggs.insert("France".to_string(), france());
        let arc = ArcPath {
            country: "France".into(),
            points: vec![[2.0, 46.0], [-0.1, 51.5]],
            color: Rgb(74, 43, 114),
            opacity_class: 2,
            width: 0.25,
        };
        let features = arc_features(&[arc], &aggs);
        let props = &features[0]["properties"];

        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert_eq!(features[0]["geometry"]["coordinates"][1][1], 51.5);
        assert_eq!(props["visitors"], 4);
        assert_eq!(props["opacity"], 0.6);
        assert_eq!(props["avgSpending"], "300.00");
        assert_eq!(props["mainPurpose"], "Unknown");
        assert_eq!(props["mainMode"], "Air");
        assert_eq!(props["lineColor"], "#4a2b72");
    }

    #[test]
    fn arc_without_spend_is_na() {
        let mut aggs = BTreeMap::new();
        aggs.insert("Peru".to_string(), CountryAggregate { count: 1, ..Default::default() });
        let arc = ArcPath {
            country: "Peru".into(),
            points: vec![],
            color: Rgb(0, 0, 0),
            opacity_class: 0,
            width: 0.2,
        };
        assert_eq!(arc_features(&[arc], &aggs)[0]["properties"]["avgSpending"], "N/A");
    }

    #[test]
    fn marker_summary_text() {
        let summary = MarkerSummary::from_aggregate(&france());
        assert_eq!(summary.main_mode, "Air");
        assert_eq!(summary.average_stay, "3.3 days");
        assert_eq!(summary.average_daily, "£120.00");
        assert_eq!(summary.average_total, "£600.00");

        let html = summary.popup_html("France");
        assert!(html.starts_with("<h3>France</h3>"));
        assert!(html.contains("Average stay duration: <b>3.3 days</b>"));
    }

    #[test]
    fn marker_summary_estimated_and_missing() {
        let estimated = CountryAggregate { count: 4, total_spend: 100.0, ..Default::default() };
        let summary = MarkerSummary::from_aggregate(&estimated);
        assert_eq!(summary.average_total, "£25.00 (estimated)");
        assert_eq!(summary.average_stay, "No data");
        assert_eq!(summary.average_daily, "No data");

        let empty = MarkerSummary::from_aggregate(&CountryAggregate { count: 1, ..Default::default() });
        assert_eq!(empty.average_total, "No data");
        assert_eq!(empty.main_mode, "Unknown");
    }

    #[test]
    fn markers_skip_unplaceable_countries() {
        let mut aggs = BTreeMap::new();
        aggs.insert("France".to_string(), france());
        aggs.insert("Narnia".to_string(), CountryAggregate { count: 1, ..Default::default() });
        let markers = marker_features(&aggs, country_center);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0]["geometry"]["type"], "Point");

        let collection = feature_collection(markers);
        assert_eq!(collection["type"], "FeatureCollection");
        assert_eq!(collection["features"].as_array().map(Vec::len), Some(1));
    }
}
