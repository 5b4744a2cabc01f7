//! Arc instances from origin countries to the destination
//!
//! Each country gets as many arcs as its line budget allows. The arcs fan
//! out around the country's centre and converge on the destination with a
//! small jitter, each with its own curvature, colour and opacity so that
//! siblings remain distinguishable.

use crate::aggregate::CountryAggregate;
use crate::allocate::LineBudget;
use crate::arc::build_arc;
use crate::geo::{haversine_km, LonLat, LONDON};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};
use std::fmt;
use tracing::debug;

/// Opacity for each opacity class.
pub const OPACITY_LEVELS: [f64; 5] = [0.4, 0.5, 0.6, 0.7, 0.8];

const PURPLE: Rgb = Rgb(74, 43, 114);
const RED: Rgb = Rgb(188, 71, 64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Shift each channel by the given offsets, clamped to 0..=255.
    pub fn jitter(self, offsets: [f64; 3]) -> Rgb {
        let shift = |c: u8, d: f64| (c as f64 + d).round().clamp(0.0, 255.0) as u8;
        Rgb(shift(self.0, offsets[0]), shift(self.1, offsets[1]), shift(self.2, offsets[2]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// One rendered arc from a country to the destination.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArcPath {
    pub country: String,
    pub points: Vec<LonLat>,
    pub color: Rgb,
    pub opacity_class: usize,
    pub width: f64,
}

impl ArcPath {
    pub fn opacity(&self) -> f64 {
        OPACITY_LEVELS[self.opacity_class.min(OPACITY_LEVELS.len() - 1)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowOptions {
    pub destination: LonLat,
    pub samples_per_arc: usize,
    pub budget: LineBudget,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            destination: LONDON,
            samples_per_arc: 40,
            budget: LineBudget::default(),
        }
    }
}

/// Endpoint jitter and bias for the `index`-th of `total` arcs of a country.
struct ArcJitter {
    start: LonLat,
    end: LonLat,
    curve_bias: f64,
    lateral_bias: f64,
}

impl ArcJitter {
    fn sample<R: Rng + ?Sized>(origin: LonLat, destination: LonLat, index: u32, total: u32, rng: &mut R) -> Self {
        let distance = haversine_km(origin, destination);
        let offset_scale = (distance / 5000.0).clamp(0.1, 1.0) * 0.3;

        // Spread evenly around a circle; the random radius keeps it irregular.
        let angle = index as f64 / total as f64 * TAU;
        let radius = 0.5 + rng.gen::<f64>() * 0.5;

        let start = [
            origin[0] + angle.cos() * offset_scale * radius * 2.0,
            origin[1] + angle.sin() * offset_scale * radius,
        ];

        // Arcs converge more tightly at the destination.
        let end_angle = angle + PI / 4.0 * (rng.gen::<f64>() - 0.5);
        let end = [
            destination[0] + end_angle.cos() * 0.2 * radius * 0.2,
            destination[1] + end_angle.sin() * 0.2 * radius * 0.2,
        ];

        let curve_bias = -0.15 + 0.3 * angle.sin() + rng.gen::<f64>() * 0.3;
        let lateral_bias = -0.2 + (angle * 2.0).sin() * 0.3 + rng.gen::<f64>() * 0.2;

        Self { start, end, curve_bias, lateral_bias }
    }
}

fn arc_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let base = if rng.gen_bool(0.8) { PURPLE } else { RED };
    base.jitter([
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-3.0..3.0),
    ])
}

/// Build every arc for every country in `line_counts`.
///
/// Countries without a position from `locate` are skipped; the allocator
/// has already reported them. Arcs always carry at least two points, even
/// when `samples_per_arc` is zero.
pub fn build_flows<F, R>(
    line_counts: &BTreeMap<String, u32>,
    options: &FlowOptions,
    locate: F,
    rng: &mut R,
) -> Vec<ArcPath>
where
    F: Fn(&str) -> Option<LonLat>,
    R: Rng + ?Sized,
{
    let mut arcs = Vec::with_capacity(line_counts.values().map(|n| *n as usize).sum());

    for (country, &lines) in line_counts {
        let Some(origin) = locate(country) else {
            continue;
        };
        for i in 0..lines {
            let jitter = ArcJitter::sample(origin, options.destination, i, lines, rng);
            let points = build_arc(
                jitter.start,
                jitter.end,
                options.samples_per_arc.max(1),
                jitter.curve_bias,
                jitter.lateral_bias,
            );
            arcs.push(ArcPath {
                country: country.clone(),
                points,
                color: arc_color(rng),
                opacity_class: rng.gen_range(0..OPACITY_LEVELS.len()),
                width: 0.2 + rng.gen::<f64>() * 0.1,
            });
        }
    }

    debug!(arcs = arcs.len(), countries = line_counts.len(), "flows built");
    arcs
}

/// Countries ordered by visitor count, largest first, ties by name.
pub fn countries_by_visitors(aggregates: &BTreeMap<String, CountryAggregate>) -> Vec<(&str, u32)> {
    let mut ranked: Vec<(&str, u32)> = aggregates.iter().map(|(k, v)| (k.as_str(), v.count)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
}
