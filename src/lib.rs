//! Visitor flows into London
//!
//! Loads the international visitor survey, groups it by source country and
//! turns each country's share of visitors into a bundle of raised arcs on
//! the globe, plus the chart and map data that go with them.

pub mod aggregate;
pub mod allocate;
pub mod animation;
pub mod arc;
pub mod charts;
pub mod error;
pub mod features;
pub mod flows;
pub mod geo;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod record;
pub mod session;

pub use error::LoadError;
pub use loader::DataSource;
pub use session::{RenderOutcome, Renderer, Session, SessionOptions, Snapshot, View};
