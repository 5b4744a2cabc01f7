use crate::terminal::rgb;
use crossterm::style::Color;
use visitflow::flows::Rgb;

pub const GRATICULE: Color = Color::DarkGrey;
pub const LAND_DAY: Color = Color::Grey;
pub const COUNTRY_MARKER: Color = Color::White;
pub const MOVING_POINT: Color = Color::White;
pub const LONDON: Color = Color::Yellow;
pub const PANEL_TITLE: Color = Color::White;
pub const PANEL_TEXT: Color = Color::Grey;
pub const PANEL_DIM: Color = Color::DarkGrey;
pub const ERROR: Color = Color::Red;

/// Arc colour on a dark terminal at the given opacity.
///
/// The survey palette is dark, so it is lifted toward white before the
/// opacity is applied. `lit` samples carry a flowing-light dash.
pub fn arc_shade(color: Rgb, opacity: f64, lit: bool) -> Color {
    let lift = if lit { 0.75 } else { 0.35 };
    let strength = if lit { 1.0 } else { opacity.clamp(0.0, 1.0) * 0.8 + 0.2 };
    let channel = |c: u8| {
        let lifted = c as f64 + (255.0 - c as f64) * lift;
        (lifted * strength).round().clamp(0.0, 255.0) as u8
    };
    rgb(channel(color.0), channel(color.1), channel(color.2))
}

/// Halo around the destination marker.
pub fn glow(opacity: f64) -> Color {
    let level = (80.0 + opacity.clamp(0.0, 1.0) * 500.0).min(255.0) as u8;
    rgb(level, level, 0)
}

/// `#rrggbb` to a terminal colour.
pub fn hex(code: &str) -> Option<Color> {
    let digits = code.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(hex("#c2c0e0"), Some(rgb(0xc2, 0xc0, 0xe0)));
        assert_eq!(hex("c2c0e0"), None);
        assert_eq!(hex("#c2c0"), None);
        assert_eq!(hex("#zzzzzz"), None);
    }

    #[test]
    fn lit_arcs_are_brighter() {
        let purple = Rgb(74, 43, 114);
        let (Color::Rgb { r: dim, .. }, Color::Rgb { r: lit, .. }) =
            (arc_shade(purple, 0.4, false), arc_shade(purple, 0.4, true))
        else {
            panic!("expected rgb colours");
        };
        assert!(lit > dim);
    }

    #[test]
    fn opacity_scales_brightness() {
        let red = Rgb(188, 71, 64);
        let (Color::Rgb { r: low, .. }, Color::Rgb { r: high, .. }) =
            (arc_shade(red, 0.4, false), arc_shade(red, 0.8, false))
        else {
            panic!("expected rgb colours");
        };
        assert!(high > low);
    }
}
