//! Market name normalization
//!
//! The survey's `market` column is free text with inconsistent casing and a
//! few regional aliases. Every lookup goes through the uppercase form; names
//! the table does not know pass through untouched and become their own
//! aggregation key.

use std::collections::HashMap;
use std::sync::LazyLock;

static MARKET_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("FRANCE", "France"),
        ("SPAIN", "Spain"),
        ("GERMANY", "Germany"),
        ("ITALY", "Italy"),
        ("NETHERLANDS", "Netherlands"),
        ("POLAND", "Poland"),
        ("BELGIUM", "Belgium"),
        ("USA", "USA"),
        ("NORTH AMERICA", "USA"),
        ("CANADA", "Canada"),
        ("AUSTRALIA", "Australia"),
        ("CHINA", "China"),
        ("HONG KONG", "Hong Kong"),
        ("JAPAN", "Japan"),
        ("INDIA", "India"),
        ("BRAZIL", "Brazil"),
        ("RUSSIA", "Russia"),
        ("UK", "UK"),
        ("BRITISH", "UK"),
        ("ENGLAND", "UK"),
        ("IRELAND", "Ireland"),
        ("SWEDEN", "Sweden"),
        ("NORWAY", "Norway"),
        ("DENMARK", "Denmark"),
        ("SWITZERLAND", "Switzerland"),
        ("PORTUGAL", "Portugal"),
        ("GREECE", "Greece"),
        ("TURKEY", "Turkey"),
        ("SOUTH AFRICA", "South Africa"),
        ("MEXICO", "Mexico"),
        ("ARGENTINA", "Argentina"),
        ("NEW ZEALAND", "New Zealand"),
        ("SOUTH KOREA", "South Korea"),
        ("KOREA", "South Korea"),
        ("UAE", "United Arab Emirates"),
        ("SAUDI ARABIA", "Saudi Arabia"),
        ("ISRAEL", "Israel"),
        ("EGYPT", "Egypt"),
        ("MOROCCO", "Morocco"),
        ("THAILAND", "Thailand"),
        ("SINGAPORE", "Singapore"),
        ("MALAYSIA", "Malaysia"),
        ("INDONESIA", "Indonesia"),
        ("PHILIPPINES", "Philippines"),
        ("VIETNAM", "Vietnam"),
        ("TAIWAN", "Taiwan"),
        ("CZECH REPUBLIC", "Czech Republic"),
        ("HUNGARY", "Hungary"),
        ("ROMANIA", "Romania"),
        ("BULGARIA", "Bulgaria"),
        ("CROATIA", "Croatia"),
        ("ESTONIA", "Estonia"),
        ("LATVIA", "Latvia"),
        ("LITHUANIA", "Lithuania"),
        ("SLOVAKIA", "Slovakia"),
        ("SLOVENIA", "Slovenia"),
        ("LUXEMBOURG", "Luxembourg"),
        ("MALTA", "Malta"),
        ("CYPRUS", "Cyprus"),
        ("ICELAND", "Iceland"),
        ("FINLAND", "Finland"),
        ("OTHER COUNTRIES", "Other"),
    ])
});

/// Canonical country name for a raw market string.
///
/// Case-insensitive for known aliases; unknown markets are returned as given.
pub fn normalize(raw_market: &str) -> String {
    let upper = raw_market.trim().to_uppercase();
    match MARKET_ALIASES.get(upper.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => raw_market.to_string(),
    }
}

/// Number of known aliases.
pub fn alias_count() -> usize {
    MARKET_ALIASES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn british_maps_to_uk() {
        assert_eq!(normalize("BRITISH"), "UK");
        assert_eq!(normalize("England"), "UK");
    }

    #[test]
    fn regional_alias() {
        assert_eq!(normalize("North America"), "USA");
        assert_eq!(normalize("Other Countries"), "Other");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(normalize("france"), "France");
        assert_eq!(normalize("FrAnCe"), "France");
        assert_eq!(normalize("  spain "), "Spain");
    }

    #[test]
    fn unknown_passes_through() {
        assert_eq!(normalize("Unknown Country"), "Unknown Country");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn idempotent_for_every_alias() {
        for raw in MARKET_ALIASES.keys() {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "alias {raw}");
        }
    }

    #[test]
    fn table_size() {
        assert!(alias_count() >= 60);
    }
}
