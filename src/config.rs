//! Runtime configuration merged from command-line flags and settings.

use crate::settings::{ArcSettings, DataSettings, GlobeSettings};
use std::path::PathBuf;
use visitflow::allocate::LineBudget;
use visitflow::flows::FlowOptions;
use visitflow::loader::DataSource;
use visitflow::SessionOptions;

/// Flags shared by every subcommand. `None` defers to settings, then to the
/// built-in default.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub samples: Option<usize>,
    /// Cap on arcs for any one country.
    pub max_lines: Option<u32>,
    /// Nominal arc total shared out by visitor share.
    pub line_budget: Option<u32>,
    pub seed: Option<u64>,
}

/// Configuration for the interactive globe
#[derive(Clone, Debug, PartialEq)]
pub struct GlobeConfig {
    pub time_step: f32,
    /// Latitude (degrees) the view starts centred on.
    pub tilt: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            time_step: 0.04,
            tilt: 35.0,
        }
    }
}

impl GlobeConfig {
    pub fn resolve(settings: &GlobeSettings, time: Option<f32>, tilt: Option<f64>) -> Self {
        let defaults = Self::default();
        Self {
            time_step: time.or(settings.speed).unwrap_or(defaults.time_step).clamp(0.005, 1.0),
            tilt: tilt.or(settings.tilt).unwrap_or(defaults.tilt).clamp(-89.0, 89.0),
        }
    }
}

/// File beats URL; flags beat settings.
pub fn data_source(settings: &DataSettings, overrides: &Overrides) -> DataSource {
    if let Some(path) = &overrides.file {
        return DataSource::File(path.clone());
    }
    if let Some(url) = &overrides.url {
        return DataSource::Url(url.clone());
    }
    if let Some(path) = &settings.file {
        return DataSource::File(path.clone());
    }
    match &settings.url {
        Some(url) => DataSource::Url(url.clone()),
        None => DataSource::default(),
    }
}

pub fn session_options(settings: &ArcSettings, overrides: &Overrides) -> SessionOptions {
    let defaults = FlowOptions::default();
    let budget = LineBudget {
        max_total_lines: overrides
            .line_budget
            .or(settings.max_total_lines)
            .unwrap_or(defaults.budget.max_total_lines)
            .max(1),
        max_lines_per_country: overrides
            .max_lines
            .or(settings.max_lines_per_country)
            .unwrap_or(defaults.budget.max_lines_per_country)
            .max(1),
    };
    SessionOptions {
        flow: FlowOptions {
            samples_per_arc: overrides
                .samples
                .or(settings.samples)
                .unwrap_or(defaults.samples_per_arc)
                .max(1),
            budget,
            ..defaults
        },
        seed: overrides.seed.or(settings.seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_beat_settings() {
        let settings = ArcSettings {
            samples: Some(20),
            max_total_lines: Some(300),
            max_lines_per_country: Some(50),
            seed: Some(1),
        };
        let overrides = Overrides { samples: Some(64), seed: Some(9), ..Default::default() };
        let options = session_options(&settings, &overrides);
        assert_eq!(options.flow.samples_per_arc, 64);
        assert_eq!(options.flow.budget.max_total_lines, 300);
        assert_eq!(options.flow.budget.max_lines_per_country, 50);
        assert_eq!(options.seed, Some(9));
    }

    #[test]
    fn line_flags_set_their_own_limits() {
        let settings = ArcSettings {
            max_total_lines: Some(300),
            max_lines_per_country: Some(50),
            ..Default::default()
        };
        let per_country = Overrides { max_lines: Some(2), ..Default::default() };
        let budget = session_options(&settings, &per_country).flow.budget;
        assert_eq!(budget.max_lines_per_country, 2);
        assert_eq!(budget.max_total_lines, 300);

        let total = Overrides { line_budget: Some(40), ..Default::default() };
        let budget = session_options(&settings, &total).flow.budget;
        assert_eq!(budget.max_lines_per_country, 50);
        assert_eq!(budget.max_total_lines, 40);
    }

    #[test]
    fn zero_samples_still_give_a_segment() {
        let settings = ArcSettings { samples: Some(0), ..Default::default() };
        let options = session_options(&settings, &Overrides::default());
        assert_eq!(options.flow.samples_per_arc, 1);
        let options = session_options(&ArcSettings::default(), &Overrides { samples: Some(0), ..Default::default() });
        assert_eq!(options.flow.samples_per_arc, 1);
    }

    #[test]
    fn defaults_when_nothing_set() {
        let options = session_options(&ArcSettings::default(), &Overrides::default());
        assert_eq!(options, SessionOptions::default());
        assert_eq!(data_source(&DataSettings::default(), &Overrides::default()), DataSource::default());
    }

    #[test]
    fn file_flag_wins() {
        let settings = DataSettings { url: Some("http://example.test/a.csv".into()), file: None };
        let overrides = Overrides {
            url: Some("http://example.test/b.csv".into()),
            file: Some(PathBuf::from("local.csv")),
            ..Default::default()
        };
        assert_eq!(data_source(&settings, &overrides), DataSource::File(PathBuf::from("local.csv")));
        assert_eq!(
            data_source(&settings, &Overrides::default()),
            DataSource::Url("http://example.test/a.csv".into())
        );
    }

    #[test]
    fn globe_values_are_clamped() {
        let settings = GlobeSettings { tilt: Some(120.0), speed: None };
        let config = GlobeConfig::resolve(&settings, Some(0.0), None);
        assert_eq!(config.tilt, 89.0);
        assert_eq!(config.time_step, 0.005);
    }
}
