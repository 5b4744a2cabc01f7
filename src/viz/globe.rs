//! Braille globe with visitor arcs converging on London
//!
//! Arcs fade in, then carry two flowing-light dashes toward the
//! destination while small markers travel along them. Only the hemisphere
//! facing the viewer is drawn.

use super::panel::{self, PanelData, PANEL_WIDTH};
use super::{KeyAction, VizState};
use crate::colors;
use crate::config::GlobeConfig;
use crate::help::render_overlay;
use crate::terminal::Terminal;
use crossterm::event::KeyCode;
use crossterm::style::Color;
use std::io;
use visitflow::animation::{seed_moving_points, DashCycle, FadeIn, MovingPoint};
use visitflow::geo::{country_center, hemisphere_visible, LonLat, LONDON};
use visitflow::{RenderOutcome, Renderer, Snapshot, View};

/// Coastline outlines, `[lon, lat]` in degrees.
static COASTLINES: &[&[LonLat]] = &[
    // North America
    &[
        [-90.5, 69.5], [-81.4, 67.1], [-94.7, 58.9], [-79.9, 51.2], [-77.4, 62.6],
        [-67.6, 58.2], [-64.6, 60.3], [-55.8, 53.3], [-71.1, 46.8], [-65.1, 49.2],
        [-59.8, 45.9], [-76.3, 39.2], [-81.3, 31.4], [-80.4, 25.2], [-84.1, 30.1],
        [-97.1, 27.8], [-95.9, 18.8], [-87.1, 21.5], [-88.9, 15.9], [-83.4, 15.3],
        [-82.2, 9.0], [-74.9, 11.1], [-80.9, 7.2], [-105.0, 19.3], [-113.1, 31.2],
        [-109.4, 23.4], [-112.2, 24.7], [-124.4, 40.3], [-122.8, 49.0], [-134.1, 58.1],
        [-150.6, 61.3], [-164.8, 54.4], [-157.0, 58.9], [-166.1, 61.5], [-160.8, 64.8],
        [-168.1, 65.7], [-156.6, 71.4], [-108.9, 67.4], [-96.1, 67.3], [-95.2, 71.9],
        [-90.5, 69.5],
    ],
    // South America
    &[
        [-74.9, 11.1], [-61.9, 10.7], [-51.3, 4.2], [-50.4, -0.1], [-34.7, -7.3],
        [-40.9, -21.9], [-47.6, -24.9], [-53.8, -34.4], [-58.4, -33.9], [-56.8, -36.9],
        [-65.1, -41.1], [-66.0, -48.1], [-71.0, -53.8], [-74.9, -52.3], [-75.6, -46.6],
        [-72.7, -42.4], [-70.4, -18.3], [-76.0, -14.6], [-81.4, -4.7], [-77.1, 3.8],
        [-79.1, 9.0], [-74.9, 11.1],
    ],
    // Europe
    &[
        [29.7, 31.2], [34.3, 31.2], [36.2, 36.7], [27.6, 36.7], [26.2, 39.5],
        [41.6, 41.5], [36.7, 45.2], [39.1, 47.3], [33.9, 44.4], [30.7, 46.6],
        [28.8, 41.1], [22.6, 40.3], [23.2, 36.4], [13.9, 45.6], [18.5, 40.2],
        [15.7, 37.9], [8.9, 44.4], [-5.9, 36.0], [-8.9, 36.9], [-9.4, 43.0],
        [-1.9, 43.4], [-4.6, 48.7], [8.1, 53.5], [8.5, 57.1], [10.9, 54.0],
        [19.7, 54.4], [23.3, 59.2], [29.1, 60.0], [21.3, 60.7], [25.4, 65.1],
        [22.2, 65.7], [12.9, 55.4], [10.4, 59.5], [5.7, 58.6], [5.9, 62.6],
        [19.2, 69.8], [31.3, 70.5], [33.8, 69.3], [29.7, 31.2],
    ],
    // Africa
    &[
        [32.4, 29.9], [42.7, 11.7], [51.0, 10.6], [39.2, -4.7], [40.8, -14.7],
        [34.8, -19.8], [35.5, -24.1], [28.2, -32.8], [19.6, -34.8], [11.8, -18.1],
        [13.7, -10.7], [9.4, 3.7], [4.3, 6.3], [-8.0, 4.4], [-17.6, 14.7],
        [32.4, 29.9],
    ],
    // Asia
    &[
        [107.0, 77.0], [131.3, 70.8], [178.6, 69.4], [179.2, 62.3], [163.5, 59.9],
        [156.8, 51.0], [155.9, 56.8], [164.5, 62.6], [135.1, 54.7], [141.4, 52.2],
        [127.5, 39.8], [129.1, 35.1], [121.6, 40.9], [118.0, 39.2], [122.4, 37.5],
        [119.2, 34.9], [121.7, 28.2], [105.9, 19.8], [109.3, 13.4], [105.2, 8.6],
        [100.1, 13.4], [104.2, 1.3], [91.4, 22.8], [80.3, 15.9], [77.5, 8.0],
        [72.6, 21.4], [48.9, 30.3], [51.8, 24.0], [56.4, 26.4], [59.8, 22.3],
        [43.5, 12.6], [39.1, 21.3], [33.8, 69.3], [41.1, 67.5], [33.2, 66.6],
        [37.0, 63.8], [43.5, 68.6], [68.5, 68.1], [66.7, 71.0], [69.9, 73.0],
        [72.4, 66.2], [74.7, 72.8], [107.0, 77.0],
    ],
    // Australia
    &[
        [143.6, -13.8], [153.1, -26.1], [150.0, -37.4], [140.6, -38.0], [138.2, -34.4],
        [136.8, -35.3], [137.8, -32.9], [136.0, -34.9], [131.3, -31.5], [115.0, -34.2],
        [114.1, -21.8], [120.9, -19.7], [125.7, -14.2], [129.6, -15.0], [132.4, -11.1],
        [136.5, -11.9], [135.5, -15.0], [140.2, -17.7], [142.1, -11.0], [143.6, -13.8],
    ],
    // Greenland
    &[
        [-27.1, 83.5], [-20.8, 82.7], [-31.4, 82.0], [-12.2, 81.3], [-20.0, 80.2],
        [-17.7, 80.1], [-21.7, 76.6], [-19.4, 74.3], [-26.4, 70.2], [-22.3, 70.1],
        [-39.8, 65.5], [-43.4, 60.1], [-51.6, 63.6], [-54.0, 67.2], [-50.9, 69.9],
        [-54.7, 69.6], [-51.4, 70.6], [-58.6, 75.5], [-73.3, 78.0], [-62.7, 81.8],
        [-27.1, 83.5],
    ],
    // Japan
    &[
        [141.0, 37.1], [135.8, 33.5], [131.0, 33.9], [130.2, 31.4], [129.4, 33.3],
        [139.4, 38.2], [140.3, 41.2], [141.0, 37.1],
    ],
    // UK/Ireland
    &[
        [-3.0, 58.6], [1.4, 51.3], [-5.2, 50.0], [-2.9, 54.0], [-6.1, 56.8],
        [-3.0, 58.6],
    ],
];

// Dot layers, lowest first. A dot only overwrites one of a lower layer.
const GRID: u8 = 1;
const LAND: u8 = 2;
const ARC: u8 = 3;
const ARC_LIT: u8 = 4;
const MARKER: u8 = 5;
const POINT: u8 = 6;
const DESTINATION: u8 = 7;

/// Steps drawn between consecutive outline or arc samples.
const OUTLINE_STEPS: usize = 20;
const ARC_STEPS: usize = 4;

const HELP: &str = "\
VISITOR FLOWS
─────────────────────
←/→ h/l  Rotate
↑/↓ k/j  Tilt
+/-      Zoom in/out
0        Reset view
1-9      Frame speed
space    Pause
p        Toggle panel
r        Reload data
?        Close help
q        Quit";

#[derive(Clone, Copy)]
struct Dot {
    layer: u8,
    color: Color,
}

const EMPTY: Dot = Dot { layer: 0, color: Color::Reset };

/// Sub-cell dot grid: two dots across and four down per terminal cell.
struct Canvas {
    width: usize,
    height: usize,
    dots: Vec<Dot>,
}

impl Canvas {
    fn new(cols: u16, rows: u16) -> Self {
        let (width, height) = (cols as usize * 2, rows as usize * 4);
        Self { width, height, dots: vec![EMPTY; width * height] }
    }

    fn clear(&mut self) {
        self.dots.fill(EMPTY);
    }

    fn plot(&mut self, x: i32, y: i32, layer: u8, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let dot = &mut self.dots[y as usize * self.width + x as usize];
        if layer >= dot.layer {
            *dot = Dot { layer, color };
        }
    }

    fn get(&self, x: usize, y: usize) -> Dot {
        self.dots[y * self.width + x]
    }

    /// Pack the dots into braille characters on `term`.
    fn compose(&self, term: &mut Terminal) {
        const DOT_BITS: [(usize, usize, u32); 8] = [
            (0, 0, 0x01), (0, 1, 0x02), (0, 2, 0x04), (1, 0, 0x08),
            (1, 1, 0x10), (1, 2, 0x20), (0, 3, 0x40), (1, 3, 0x80),
        ];
        for cy in 0..self.height / 4 {
            for cx in 0..self.width / 2 {
                let mut bits = 0u32;
                let mut top = EMPTY;
                for &(dx, dy, bit) in &DOT_BITS {
                    let dot = self.get(cx * 2 + dx, cy * 4 + dy);
                    if dot.layer > 0 {
                        bits |= bit;
                        if dot.layer >= top.layer {
                            top = dot;
                        }
                    }
                }
                if bits > 0 {
                    let ch = char::from_u32(0x2800 + bits).unwrap_or(' ');
                    term.set(cx as i32, cy as i32, ch, Some(top.color), top.layer >= ARC_LIT);
                }
            }
        }
    }
}

/// Orthographic projection centred on a point of the globe.
struct Projection {
    center_lon: f64,
    sin_lat0: f64,
    cos_lat0: f64,
    radius: f64,
    half_w: f64,
    half_h: f64,
}

impl Projection {
    fn new(center: LonLat, cols: u16, rows: u16, zoom: f64) -> Self {
        let (w, h) = (cols as f64, rows as f64);
        let lat0 = center[1].to_radians();
        Self {
            center_lon: center[0].to_radians(),
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
            radius: (h * 1.8).min(w * 0.8) * 0.45 * zoom,
            half_w: w / 2.0,
            half_h: h / 2.0,
        }
    }

    /// Canvas coordinates of `p`, or `None` when it faces away.
    fn project(&self, p: LonLat) -> Option<(i32, i32)> {
        let (lon, lat) = (p[0].to_radians(), p[1].to_radians());
        let d_lon = lon - self.center_lon;
        let (sin_lat, cos_lat) = lat.sin_cos();

        let depth = self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * d_lon.cos();
        if depth < 0.0 {
            return None;
        }
        let x = cos_lat * d_lon.sin();
        let y = self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * d_lon.cos();

        let screen_x = self.half_w + x * self.radius;
        let screen_y = self.half_h - y * self.radius * 0.5;
        Some(((screen_x * 2.0) as i32, (screen_y * 4.0) as i32))
    }
}

/// Draw the straight segment `a`-`b` (in lon/lat) in `steps` pieces.
fn plot_segment(canvas: &mut Canvas, proj: &Projection, a: LonLat, b: LonLat, steps: usize, layer: u8, color: Color) {
    // Segments crossing the antimeridian would wrap the whole globe.
    if (b[0] - a[0]).abs() > 180.0 {
        for p in [a, b] {
            if let Some((x, y)) = proj.project(p) {
                canvas.plot(x, y, layer, color);
            }
        }
        return;
    }
    for t in 0..steps {
        let f = t as f64 / steps as f64;
        let p = [a[0] + (b[0] - a[0]) * f, a[1] + (b[1] - a[1]) * f];
        if let Some((x, y)) = proj.project(p) {
            canvas.plot(x, y, layer, color);
        }
    }
}

fn plot_blob(canvas: &mut Canvas, center: (i32, i32), size: i32, layer: u8, color: Color) {
    for dy in -size..=size {
        for dx in -size..=size {
            if dx.abs() + dy.abs() <= size {
                canvas.plot(center.0 + dx, center.1 + dy, layer, color);
            }
        }
    }
}

/// Interactive globe for a visitflow session.
pub struct GlobeRenderer {
    term: Terminal,
    state: VizState,
    home: LonLat,
    center: LonLat,
    zoom: f64,
    canvas: Canvas,
    fade: FadeIn,
    dash: DashCycle,
    points: Vec<MovingPoint>,
    positions: Vec<Option<LonLat>>,
    panel: Option<PanelData>,
    pulse: f32,
    needs_reset: bool,
}

impl GlobeRenderer {
    pub fn new(term: Terminal, config: &GlobeConfig) -> Self {
        let (w, h) = term.size();
        // Face the Atlantic so both the Americas and Europe are in view.
        let home = [LONDON[0] - 30.0, config.tilt];
        Self {
            term,
            state: VizState::new(config.time_step),
            home,
            center: home,
            zoom: 1.0,
            canvas: Canvas::new(w, h),
            fade: FadeIn::new(),
            dash: DashCycle::default(),
            points: Vec::new(),
            positions: Vec::new(),
            panel: None,
            pulse: 0.0,
            needs_reset: true,
        }
    }

    /// Restart the animations for a freshly loaded snapshot.
    fn reset(&mut self, snapshot: Option<&Snapshot>) {
        self.fade = FadeIn::new();
        self.dash = DashCycle::default();
        self.points = snapshot
            .map(|s| seed_moving_points(&s.arcs, &s.ranked_countries()))
            .unwrap_or_default();
        self.positions = vec![None; self.points.len()];
        self.panel = snapshot.map(PanelData::from_snapshot);
    }

    fn handle_view_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.rotate(-5.0),
            KeyCode::Right | KeyCode::Char('l') => self.rotate(5.0),
            KeyCode::Up | KeyCode::Char('k') => self.center[1] = (self.center[1] + 5.0).min(89.0),
            KeyCode::Down | KeyCode::Char('j') => self.center[1] = (self.center[1] - 5.0).max(-89.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom = (self.zoom * 1.2).min(3.0),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom = (self.zoom / 1.2).max(0.4),
            KeyCode::Char('0') => {
                self.zoom = 1.0;
                self.center = self.home;
            }
            _ => {}
        }
    }

    /// Turn the globe by `degrees` of longitude, kept in -180..180.
    fn rotate(&mut self, degrees: f64) {
        self.center[0] = (self.center[0] + degrees + 180.0).rem_euclid(360.0) - 180.0;
    }

    /// Advance every animation by one tick.
    fn advance(&mut self, snapshot: Option<&Snapshot>) {
        let Some(snapshot) = snapshot else {
            return;
        };
        self.fade.tick();
        if self.fade.is_done() {
            self.dash.tick();
        }
        for (point, position) in self.points.iter_mut().zip(&mut self.positions) {
            *position = snapshot.arcs.get(point.arc).and_then(|arc| point.tick(&arc.points));
        }
        self.pulse += self.state.speed * 3.0;
    }

    fn draw_frame(&mut self, view: View<'_>) {
        let (width, height) = self.term.size();
        let panel_visible = self.state.show_panel && self.panel.is_some() && width > PANEL_WIDTH + 40;
        let globe_w = if panel_visible { width - PANEL_WIDTH - 1 } else { width };

        let proj = Projection::new(self.center, globe_w, height, self.zoom);
        let canvas = &mut self.canvas;
        canvas.clear();

        // Graticule every 30 degrees
        for lat in (-60..=60).step_by(30) {
            for lon in (-180..180).step_by(2) {
                if let Some((x, y)) = proj.project([lon as f64, lat as f64]) {
                    canvas.plot(x, y, GRID, colors::GRATICULE);
                }
            }
        }
        for lon in (-180..180).step_by(30) {
            for lat in (-90..=90).step_by(2) {
                if let Some((x, y)) = proj.project([lon as f64, lat as f64]) {
                    canvas.plot(x, y, GRID, colors::GRATICULE);
                }
            }
        }

        for outline in COASTLINES {
            for pair in outline.windows(2) {
                plot_segment(canvas, &proj, pair[0], pair[1], OUTLINE_STEPS, LAND, colors::LAND_DAY);
            }
        }

        if let Some(snapshot) = view.snapshot {
            for arc in &snapshot.arcs {
                let opacity = self.fade.line_opacity(arc.opacity());
                let samples = arc.points.len();
                for (i, pair) in arc.points.windows(2).enumerate() {
                    let lit = self.fade.is_done() && self.dash.is_lit(i, samples);
                    let (layer, color) = if lit {
                        (ARC_LIT, colors::arc_shade(arc.color, opacity, true))
                    } else {
                        (ARC, colors::arc_shade(arc.color, opacity, false))
                    };
                    plot_segment(canvas, &proj, pair[0], pair[1], ARC_STEPS, layer, color);
                }
            }

            for country in snapshot.line_counts.keys() {
                if let Some(at) = country_center(country).and_then(|c| proj.project(c)) {
                    plot_blob(canvas, at, 1, MARKER, colors::COUNTRY_MARKER);
                }
            }

            for position in self.positions.iter().flatten() {
                if !hemisphere_visible(self.center, *position) {
                    continue;
                }
                if let Some(at) = proj.project(*position) {
                    plot_blob(canvas, at, 1, POINT, colors::MOVING_POINT);
                }
            }
        }

        if let Some(at) = proj.project(LONDON) {
            let size = ((self.pulse.sin() + 1.0) * 1.5 + 2.0) as i32;
            plot_blob(canvas, at, size, DESTINATION, colors::glow(self.fade.glow_opacity()));
            plot_blob(canvas, at, 1, DESTINATION, colors::LONDON);
        }

        self.term.clear();
        self.canvas.compose(&mut self.term);

        if panel_visible {
            if let Some(data) = &self.panel {
                panel::draw(&mut self.term, globe_w as i32 + 1, data);
            }
        }

        let status = match view.snapshot {
            Some(s) => format!(
                " visitflow  {} countries  {} arcs  ? help ",
                s.aggregates.len(),
                s.arcs.len()
            ),
            None => " visitflow  no data  r retry  q quit ".to_string(),
        };
        self.term.set_str(0, height as i32 - 1, &status, Some(colors::PANEL_DIM), false);

        if let Some(err) = view.error {
            let text = format!(
                "{}\n\n{}\n\nr  retry    q  quit",
                err.headline(),
                err
            );
            render_overlay(&mut self.term, &text, colors::ERROR);
        } else if self.state.show_help {
            render_overlay(&mut self.term, HELP, Color::White);
        }
    }
}

impl Renderer for GlobeRenderer {
    fn present(&mut self, view: View<'_>) -> io::Result<RenderOutcome> {
        if self.needs_reset {
            self.reset(view.snapshot);
            self.needs_reset = false;
        }
        self.term.clear_screen()?;

        loop {
            let (width, height) = crossterm::terminal::size().unwrap_or(self.term.size());
            if (width, height) != self.term.size() {
                self.term.resize(width, height);
                self.term.clear_screen()?;
                self.canvas = Canvas::new(width, height);
            }

            if let Some((code, mods)) = self.term.check_key()? {
                match self.state.handle_key(code, mods) {
                    KeyAction::Quit => return Ok(RenderOutcome::Quit),
                    KeyAction::Refresh => {
                        self.needs_reset = true;
                        return Ok(RenderOutcome::Refresh);
                    }
                    KeyAction::None => self.handle_view_key(code),
                }
            }

            if !self.state.paused {
                self.advance(view.snapshot);
            }
            self.draw_frame(view);
            self.term.present()?;
            self.term.sleep(self.state.speed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visitflow::loader::load;
    use visitflow::{LoadError, SessionOptions};

    fn snapshot() -> Snapshot {
        let csv = "quarter,market,dur_stay,mode\nQ1,USA,4-7 nights,Air\nQ1,France,1-3 nights,Tunnel\nQ2,USA,8-14 nights,Air\n";
        let options = SessionOptions { seed: Some(3), ..Default::default() };
        Snapshot::build(load(csv).unwrap(), &options)
    }

    fn renderer(width: u16, height: u16) -> GlobeRenderer {
        GlobeRenderer::new(Terminal::headless(width, height), &GlobeConfig::default())
    }

    fn cells(globe: &GlobeRenderer) -> Vec<char> {
        let (w, h) = globe.term.size();
        (0..h as usize)
            .flat_map(|y| (0..w as usize).map(move |x| (x, y)))
            .filter_map(|(x, y)| globe.term.cell(x, y).map(|c| c.ch))
            .collect()
    }

    #[test]
    fn projection_centre_and_far_side() {
        let proj = Projection::new(LONDON, 80, 40, 1.0);
        assert_eq!(proj.project(LONDON), Some((80, 80)));
        assert_eq!(proj.project([LONDON[0] + 180.0, -LONDON[1]]), None);
    }

    #[test]
    fn canvas_packs_braille() {
        let mut canvas = Canvas::new(2, 1);
        canvas.plot(0, 0, GRID, Color::Grey);
        canvas.plot(1, 3, ARC, Color::Red);
        canvas.plot(1, 3, GRID, Color::Grey);
        let mut term = Terminal::headless(2, 1);
        canvas.compose(&mut term);
        let cell = term.cell(0, 0).unwrap();
        assert_eq!(cell.ch, char::from_u32(0x2800 + 0x01 + 0x80).unwrap());
        assert_eq!(cell.fg, Some(Color::Red));
        assert_eq!(term.cell(1, 0).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn frame_draws_globe_and_panel() {
        let snapshot = snapshot();
        let mut globe = renderer(140, 45);
        globe.reset(Some(&snapshot));
        assert_eq!(globe.points.len(), 4);

        for _ in 0..10 {
            globe.advance(Some(&snapshot));
        }
        assert!(globe.fade.is_done());
        globe.draw_frame(View { snapshot: Some(&snapshot), error: None });

        let chars = cells(&globe);
        assert!(chars.iter().any(|c| ('\u{2801}'..='\u{28ff}').contains(c)));
        let text: String = chars.into_iter().collect();
        assert!(text.contains("TOP SOURCE MARKETS"));
        assert!(text.contains("2 countries"));
    }

    #[test]
    fn load_error_shows_retry_box() {
        let err = LoadError::Empty;
        let mut globe = renderer(100, 30);
        globe.reset(None);
        globe.draw_frame(View { snapshot: None, error: Some(&err) });
        let text: String = cells(&globe).into_iter().collect();
        assert!(text.contains("retry"));
        assert!(text.contains("no data"));
    }

    #[test]
    fn view_keys_wrap_and_reset() {
        let mut globe = renderer(80, 24);
        for _ in 0..40 {
            globe.handle_view_key(KeyCode::Right);
        }
        assert!((-180.0..180.0).contains(&globe.center[0]));
        globe.handle_view_key(KeyCode::Char('+'));
        globe.handle_view_key(KeyCode::Char('0'));
        assert_eq!(globe.zoom, 1.0);
        assert_eq!(globe.center, globe.home);
    }

    #[test]
    fn reset_keeps_home_longitude_exact() {
        let mut globe = renderer(80, 24);
        globe.handle_view_key(KeyCode::Char('0'));
        assert_eq!(globe.center, globe.home);

        globe.handle_view_key(KeyCode::Left);
        globe.handle_view_key(KeyCode::Up);
        assert_ne!(globe.center, globe.home);
        globe.handle_view_key(KeyCode::Char('0'));
        assert_eq!(globe.center[0], LONDON[0] - 30.0);
        assert_eq!(globe.center, globe.home);
    }
}
