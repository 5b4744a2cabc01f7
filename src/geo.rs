//! Static geography: country centres, continents and great-circle distance.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// `[longitude, latitude]` in degrees, GeoJSON axis order.
pub type LonLat = [f64; 2];

/// Where every arc ends.
pub const LONDON: LonLat = [-0.1278, 51.5074];

/// Mean Earth radius used for distances (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

static COUNTRY_CENTERS: LazyLock<HashMap<&'static str, LonLat>> = LazyLock::new(|| {
    HashMap::from([
        ("France", [2.2137, 46.2276]),
        ("Spain", [-3.7492, 40.4637]),
        ("Germany", [10.4515, 51.1657]),
        ("Italy", [12.5674, 41.8719]),
        ("Netherlands", [5.2913, 52.1326]),
        ("Poland", [19.1451, 51.9194]),
        ("Belgium", [4.6667, 50.6402]),
        ("USA", [-95.7129, 37.0902]),
        ("Canada", [-106.3468, 56.1304]),
        ("Australia", [133.7751, -25.2744]),
        ("China", [104.1954, 35.8617]),
        ("Japan", [138.2529, 36.2048]),
        ("India", [78.9629, 20.5937]),
        ("Brazil", [-51.9253, -14.2350]),
        ("Russia", [105.3188, 61.5240]),
        ("UK", [-3.4360, 55.3781]),
        ("Ireland", [-8.2439, 53.4129]),
        ("Sweden", [18.6435, 60.1282]),
        ("Norway", [8.4689, 60.4720]),
        ("Denmark", [9.5018, 56.2639]),
        ("Switzerland", [8.2275, 46.8182]),
        ("Portugal", [-8.2245, 39.3999]),
        ("Greece", [21.8243, 39.0742]),
        ("Turkey", [35.2433, 38.9637]),
        ("South Africa", [22.9375, -30.5595]),
        ("Mexico", [-102.5528, 23.6345]),
        ("Argentina", [-63.6167, -38.4161]),
        ("New Zealand", [174.8860, -40.9006]),
        ("South Korea", [127.7669, 35.9078]),
        ("United Arab Emirates", [53.8478, 23.4241]),
        ("Saudi Arabia", [45.0792, 23.8859]),
        ("Israel", [34.8516, 31.0461]),
        ("Egypt", [30.8025, 26.8206]),
        ("Morocco", [-7.0926, 31.7917]),
        ("Thailand", [100.9925, 15.8700]),
        ("Singapore", [103.8198, 1.3521]),
        ("Malaysia", [101.9758, 4.2105]),
        ("Indonesia", [113.9213, -0.7893]),
        ("Philippines", [121.7740, 12.8797]),
        ("Vietnam", [108.2772, 14.0583]),
        ("Hong Kong", [114.1095, 22.3964]),
        ("Taiwan", [120.9605, 23.6978]),
        ("Czech Republic", [15.4730, 49.8175]),
        ("Hungary", [19.5033, 47.1625]),
        ("Romania", [24.9668, 45.9432]),
        ("Bulgaria", [25.4858, 42.7339]),
        ("Croatia", [15.2000, 45.1000]),
        ("Estonia", [25.0136, 58.5953]),
        ("Latvia", [24.6032, 56.8796]),
        ("Lithuania", [23.8813, 55.1694]),
        ("Slovakia", [19.6990, 48.6690]),
        ("Slovenia", [14.9955, 46.1512]),
        ("Luxembourg", [6.1296, 49.8153]),
        ("Malta", [14.3754, 35.9375]),
        ("Cyprus", [33.4299, 35.1264]),
        ("Iceland", [-19.0208, 64.9631]),
        ("Finland", [25.7482, 61.9241]),
    ])
});

/// Map position of a canonical country name, if known.
pub fn country_center(country: &str) -> Option<LonLat> {
    COUNTRY_CENTERS.get(country).copied()
}

/// Number of countries that can be placed on the globe.
pub fn known_country_count() -> usize {
    COUNTRY_CENTERS.len()
}

// ============================================================================
// Continents
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Continent {
    Asia,
    Europe,
    NorthAmerica,
    SouthAmerica,
    Oceania,
    Africa,
}

impl Continent {
    pub const ALL: [Continent; 6] = [
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Oceania,
        Continent::Africa,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Oceania => "Oceania",
            Continent::Africa => "Africa",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Continent of a canonical country name. Countries outside the six
/// charted continents (and the "Other" bucket) return `None`.
pub fn continent_of(country: &str) -> Option<Continent> {
    let continent = match country {
        "China" | "Japan" | "South Korea" | "India" | "Singapore" | "Malaysia" | "Thailand"
        | "Indonesia" | "Philippines" | "Vietnam" | "Hong Kong" | "Taiwan" | "Israel"
        | "UAE" | "United Arab Emirates" | "Saudi Arabia" => Continent::Asia,
        "France" | "Germany" | "Italy" | "Spain" | "Netherlands" | "Belgium" | "Switzerland"
        | "Sweden" | "Norway" | "Denmark" | "Finland" | "Portugal" | "Greece" | "Turkey"
        | "Poland" | "Czech Republic" | "Hungary" | "Romania" | "Bulgaria" | "Croatia"
        | "Estonia" | "Latvia" | "Lithuania" | "Slovakia" | "Slovenia" | "Luxembourg"
        | "Malta" | "Cyprus" | "Iceland" | "Ireland" | "UK" | "Russia" => Continent::Europe,
        "USA" | "Canada" | "Mexico" => Continent::NorthAmerica,
        "Brazil" | "Argentina" | "Colombia" | "Peru" | "Chile" | "Venezuela" | "Ecuador" => {
            Continent::SouthAmerica
        }
        "Australia" | "New Zealand" => Continent::Oceania,
        "South Africa" | "Egypt" | "Morocco" | "Nigeria" | "Kenya" | "Tunisia" => {
            Continent::Africa
        }
        _ => return None,
    };
    Some(continent)
}

// ============================================================================
// Distance
// ============================================================================

/// Great-circle distance in kilometres (haversine).
pub fn haversine_km(a: LonLat, b: LonLat) -> f64 {
    let (lat1, lat2) = (a[1].to_radians(), b[1].to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b[0] - a[0]).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Whether `point` lies within 85° of `center`, i.e. on the visible side of
/// a globe looking down at `center`.
pub fn hemisphere_visible(center: LonLat, point: LonLat) -> bool {
    let (lon1, lat1) = (center[0].to_radians(), center[1].to_radians());
    let (lon2, lat2) = (point[0].to_radians(), point[1].to_radians());
    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos();
    cos_angle.clamp(-1.0, 1.0).acos().to_degrees() < 85.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn london_to_paris_distance() {
        let paris = [2.3522, 48.8566];
        let d = haversine_km(LONDON, paris);
        assert!((d - 343.5).abs() < 2.0, "got {d}");
    }

    #[test]
    fn distance_is_zero_for_same_point() {
        assert!(haversine_km(LONDON, LONDON).abs() < 1e-9);
    }

    #[test]
    fn every_alias_target_with_a_center_is_known() {
        assert_eq!(country_center(&normalize("FRANCE")), Some([2.2137, 46.2276]));
        assert_eq!(country_center(&normalize("UAE")), Some([53.8478, 23.4241]));
        assert!(country_center("Other").is_none());
        assert!(known_country_count() >= 55);
    }

    #[test]
    fn continents() {
        assert_eq!(continent_of("France"), Some(Continent::Europe));
        assert_eq!(continent_of("United Arab Emirates"), Some(Continent::Asia));
        assert_eq!(continent_of("New Zealand"), Some(Continent::Oceania));
        assert_eq!(continent_of("Other"), None);
        assert_eq!(Continent::NorthAmerica.to_string(), "North America");
    }

    #[test]
    fn hemisphere_visibility() {
        assert!(hemisphere_visible(LONDON, [2.0, 48.0]));
        assert!(!hemisphere_visible(LONDON, [174.8860, -40.9006]));
    }
}
