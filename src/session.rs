//! Pipeline state for one run of the program.
//!
//! A [`Session`] owns the data source and the options, and holds the most
//! recent [`Snapshot`] of everything derived from the dataset. Refreshing
//! rebuilds the snapshot in full; renderers only ever see a finished one.

use crate::aggregate::{aggregate, CountryAggregate};
use crate::allocate::allocate_line_counts;
use crate::error::LoadError;
use crate::flows::{build_flows, countries_by_visitors, ArcPath, FlowOptions};
use crate::geo::country_center;
use crate::loader::{load_from, DataSource};
use crate::record::VisitorRecord;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::io;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionOptions {
    pub flow: FlowOptions,
    /// Fixed seed for arc jitter; fresh entropy on every refresh when unset.
    pub seed: Option<u64>,
}

/// Everything derived from one load of the dataset.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub records: Vec<VisitorRecord>,
    pub aggregates: BTreeMap<String, CountryAggregate>,
    pub line_counts: BTreeMap<String, u32>,
    pub arcs: Vec<ArcPath>,
}

impl Snapshot {
    /// Run the pipeline over already-loaded records.
    pub fn build(records: Vec<VisitorRecord>, options: &SessionOptions) -> Self {
        let aggregates = aggregate(&records);
        let line_counts = allocate_line_counts(&aggregates, options.flow.budget, country_center);
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let arcs = build_flows(&line_counts, &options.flow, country_center, &mut rng);
        Self {
            records,
            aggregates,
            line_counts,
            arcs,
        }
    }

    /// Countries by visitor count, largest first.
    pub fn ranked_countries(&self) -> Vec<&str> {
        countries_by_visitors(&self.aggregates)
            .into_iter()
            .map(|(country, _)| country)
            .collect()
    }
}

/// What a renderer is handed each time it is asked to present.
#[derive(Clone, Copy, Debug)]
pub struct View<'a> {
    pub snapshot: Option<&'a Snapshot>,
    /// Set when the latest load failed; `snapshot` then holds the last good
    /// data, if any.
    pub error: Option<&'a LoadError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Output written, nothing more to do.
    Done,
    /// The user asked to leave.
    Quit,
    /// Reload the dataset and present again.
    Refresh,
}

/// A presentation surface for a session's data.
pub trait Renderer {
    fn present(&mut self, view: View<'_>) -> io::Result<RenderOutcome>;
}

pub struct Session {
    source: DataSource,
    options: SessionOptions,
    snapshot: Option<Snapshot>,
    last_error: Option<LoadError>,
}

impl Session {
    /// A session that has not loaded anything yet.
    pub fn new(source: DataSource, options: SessionOptions) -> Self {
        Self {
            source,
            options,
            snapshot: None,
            last_error: None,
        }
    }

    /// Create a session and perform the first load.
    pub fn init(source: DataSource, options: SessionOptions) -> Result<Self, LoadError> {
        let records = load_from(&source)?;
        let snapshot = Snapshot::build(records, &options);
        Ok(Self {
            source,
            options,
            snapshot: Some(snapshot),
            last_error: None,
        })
    }

    /// Reload from the source and rebuild the snapshot. On failure the
    /// previous snapshot is kept and the error is remembered for the view.
    pub fn refresh(&mut self) -> Result<&Snapshot, &LoadError> {
        info!(source = %self.source, "loading dataset");
        match load_from(&self.source) {
            Ok(records) => {
                let snapshot = Snapshot::build(records, &self.options);
                debug!(
                    records = snapshot.records.len(),
                    countries = snapshot.aggregates.len(),
                    arcs = snapshot.arcs.len(),
                    "snapshot ready"
                );
                self.last_error = None;
                Ok(&*self.snapshot.insert(snapshot))
            }
            Err(err) => {
                warn!(error = %err, "load failed");
                Err(&*self.last_error.insert(err))
            }
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    pub fn view(&self) -> View<'_> {
        View {
            snapshot: self.snapshot.as_ref(),
            error: self.last_error.as_ref(),
        }
    }

    /// Present to `renderer` until it is done, reloading whenever it asks.
    pub fn drive<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> io::Result<()> {
        if self.snapshot.is_none() && self.last_error.is_none() {
            let _ = self.refresh();
        }
        loop {
            match renderer.present(self.view())? {
                RenderOutcome::Done | RenderOutcome::Quit => return Ok(()),
                RenderOutcome::Refresh => {
                    let _ = self.refresh();
                }
            }
        }
    }

    /// Release the snapshot and end the session.
    pub fn teardown(self) {
        debug!(source = %self.source, had_data = self.snapshot.is_some(), "session closed");
    }
}
