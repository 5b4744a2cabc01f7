//! Tick-driven animation state for the flow display.
//!
//! Nothing here reads records or aggregates; every type only advances its
//! own presentation state one tick at a time.

use crate::flows::ArcPath;
use crate::geo::LonLat;

/// Opacity gained per fade-in tick.
const FADE_STEP: f64 = 0.05;
/// Fade-in finishes once the shared opacity reaches this value.
const FADE_TARGET: f64 = 0.3;
const SETTLED_GLOW: f64 = 0.15;

/// Shared opacity ramp played once after the arcs first appear.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FadeIn {
    opacity: f64,
    done: bool,
}

impl FadeIn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        if self.done {
            return;
        }
        self.opacity += FADE_STEP;
        if self.opacity >= FADE_TARGET - 1e-9 {
            self.done = true;
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Opacity for an arc whose own opacity is `feature_opacity`. While
    /// ramping every arc shares the ramp value.
    pub fn line_opacity(&self, feature_opacity: f64) -> f64 {
        if self.done {
            feature_opacity
        } else {
            self.opacity
        }
    }

    pub fn glow_opacity(&self) -> f64 {
        if self.done {
            SETTLED_GLOW
        } else {
            self.opacity * 0.3
        }
    }
}

/// Two flowing-light dash patterns moving along every arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashCycle {
    pub primary: f64,
    pub secondary: f64,
}

impl Default for DashCycle {
    fn default() -> Self {
        Self { primary: 0.0, secondary: 7.5 }
    }
}

impl DashCycle {
    pub const PRIMARY_PERIOD: f64 = 11.0;
    pub const SECONDARY_PERIOD: f64 = 15.5;
    /// Lit length of each light, in the same units as the periods.
    pub const PRIMARY_DASH: f64 = 1.0;
    pub const SECONDARY_DASH: f64 = 0.7;

    pub fn tick(&mut self) {
        self.primary = (self.primary + 0.3) % Self::PRIMARY_PERIOD;
        self.secondary = (self.secondary + 0.4) % Self::SECONDARY_PERIOD;
    }

    /// Whether sample `index` of `len` is lit by either light. Used by
    /// renderers that draw arcs as discrete samples.
    pub fn is_lit(&self, index: usize, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        let t = index as f64 / len as f64;
        let lit = |offset: f64, period: f64, dash: f64| {
            let phase = (t * period * 2.0 - offset).rem_euclid(period);
            phase < dash
        };
        lit(self.primary, Self::PRIMARY_PERIOD, Self::PRIMARY_DASH)
            || lit(self.secondary, Self::SECONDARY_PERIOD, Self::SECONDARY_DASH)
    }
}

/// A marker travelling from a country to the destination along one arc.
#[derive(Clone, Debug, PartialEq)]
pub struct MovingPoint {
    /// Index into the arc list it was seeded from.
    pub arc: usize,
    pub progress: f64,
    pub speed: f64,
}

/// Past this fraction of the path a point jumps back to the start.
const RESET_AT: f64 = 0.95;
const SPEED_FACTOR: f64 = 1.5;

impl MovingPoint {
    /// Advance one tick and return the position to draw, or `None` on the
    /// frame the point wraps back to the start.
    pub fn tick(&mut self, path: &[LonLat]) -> Option<LonLat> {
        if self.progress >= RESET_AT {
            self.progress = 0.0;
            return None;
        }
        let position = position_along(path, self.progress);
        self.progress += self.speed * SPEED_FACTOR;
        position
    }
}

/// Linear interpolation between path samples at `progress` in `0..=1`.
pub fn position_along(path: &[LonLat], progress: f64) -> Option<LonLat> {
    let last = path.len().checked_sub(1)?;
    if last == 0 {
        return path.first().copied();
    }
    let scaled = progress.clamp(0.0, 1.0) * last as f64;
    let index = scaled.floor() as usize;
    if index >= last {
        return Some(path[last]);
    }
    let (a, b) = (path[index], path[index + 1]);
    let f = scaled - index as f64;
    Some([a[0] + (b[0] - a[0]) * f, a[1] + (b[1] - a[1]) * f])
}

/// Countries ranked within this many get two moving points.
const MAIN_COUNTRIES: usize = 20;

/// One or two moving points on the first arc of each country.
///
/// `ranked` is the country order by visitors, largest first.
pub fn seed_moving_points(arcs: &[ArcPath], ranked: &[&str]) -> Vec<MovingPoint> {
    let mut points = Vec::new();
    for (rank, country) in ranked.iter().enumerate() {
        let Some(arc) = arcs.iter().position(|a| a.country == *country) else {
            continue;
        };
        if rank < MAIN_COUNTRIES {
            for j in 0..2 {
                points.push(MovingPoint {
                    arc,
                    progress: 0.3 + j as f64 * 0.4,
                    speed: 0.006 + j as f64 * 0.002,
                });
            }
        } else {
            points.push(MovingPoint { arc, progress: 0.5, speed: 0.006 });
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::Rgb;

    fn arc(country: &str) -> ArcPath {
        ArcPath {
            country: country.into(),
            points: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]],
            color: Rgb(0, 0, 0),
            opacity_class: 0,
            width: 0.2,
        }
    }

    #[test]
    fn fade_in_ramps_then_settles() {
        let mut fade = FadeIn::new();
        assert_eq!(fade.line_opacity(0.7), 0.0);
        for _ in 0..5 {
            fade.tick();
        }
        assert!(!fade.is_done());
        assert!((fade.line_opacity(0.7) - 0.25).abs() < 1e-9);
        assert!((fade.glow_opacity() - 0.075).abs() < 1e-9);

        fade.tick();
        assert!(fade.is_done());
        assert_eq!(fade.line_opacity(0.7), 0.7);
        assert_eq!(fade.glow_opacity(), 0.15);
    }

    #[test]
    fn dash_offsets_wrap() {
        let mut dash = DashCycle::default();
        assert_eq!(dash.secondary, 7.5);
        for _ in 0..40 {
            dash.tick();
            assert!((0.0..DashCycle::PRIMARY_PERIOD).contains(&dash.primary));
            assert!((0.0..DashCycle::SECONDARY_PERIOD).contains(&dash.secondary));
        }
        assert!((dash.primary - 40.0 * 0.3 % 11.0).abs() < 1e-9);
    }

    #[test]
    fn some_samples_are_lit() {
        let dash = DashCycle::default();
        let lit = (0..40).filter(|i| dash.is_lit(*i, 40)).count();
        assert!(lit > 0 && lit < 40);
        assert!(!dash.is_lit(0, 0));
    }

    #[test]
    fn interpolation() {
        let path = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]];
        assert_eq!(position_along(&path, 0.0), Some([0.0, 0.0]));
        assert_eq!(position_along(&path, 0.25), Some([5.0, 0.0]));
        assert_eq!(position_along(&path, 0.75), Some([10.0, 5.0]));
        assert_eq!(position_along(&path, 1.0), Some([10.0, 10.0]));
        assert_eq!(position_along(&[], 0.5), None);
        assert_eq!(position_along(&[[1.0, 2.0]], 0.5), Some([1.0, 2.0]));
    }

    #[test]
    fn moving_point_resets_near_the_end() {
        let path = [[0.0, 0.0], [10.0, 0.0]];
        let mut point = MovingPoint { arc: 0, progress: 0.94, speed: 0.01 };
        assert!(point.tick(&path).is_some());
        assert!(point.progress >= 0.95);
        assert_eq!(point.tick(&path), None);
        assert_eq!(point.progress, 0.0);
        assert_eq!(point.tick(&path), Some([0.0, 0.0]));
    }

    #[test]
    fn main_countries_get_two_points() {
        let arcs = vec![arc("USA"), arc("USA"), arc("France")];
        let mut ranked = vec!["USA"];
        let filler: Vec<String> = (0..19).map(|i| format!("X{i}")).collect();
        ranked.extend(filler.iter().map(String::as_str));
        ranked.push("France");

        let points = seed_moving_points(&arcs, &ranked);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].progress, 0.3);
        assert_eq!(points[1].progress, 0.7);
        assert_eq!(points[2].arc, 2);
        assert_eq!(points[2].progress, 0.5);
    }
}
