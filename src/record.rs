use serde::Serialize;

/// Per-visitor spend derived from the survey's spend column.
///
/// The column is reported in millions. When the row also carries a visit
/// count the amount is divided down to a per-visitor figure; otherwise the
/// raw total is kept and the variant says so.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "basis", content = "amount", rename_all = "snake_case")]
pub enum Spend {
    PerVisitor(f64),
    Total(f64),
}

impl Spend {
    pub fn amount(&self) -> f64 {
        match *self {
            Spend::PerVisitor(v) | Spend::Total(v) => v,
        }
    }

    pub fn is_per_visitor(&self) -> bool {
        matches!(self, Spend::PerVisitor(_))
    }
}

/// One survey row after normalization of its derived fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisitorRecord {
    pub quarter: String,
    pub market: String,
    pub purpose: Option<String>,
    pub mode: Option<String>,
    pub duration_bucket: Option<String>,
    pub stay_nights: Option<u32>,
    pub spend: Option<Spend>,
    pub visits_thousands: Option<f64>,
}

impl VisitorRecord {
    /// Bare record with only the required fields set.
    pub fn new(quarter: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            quarter: quarter.into(),
            market: market.into(),
            purpose: None,
            mode: None,
            duration_bucket: None,
            stay_nights: None,
            spend: None,
            visits_thousands: None,
        }
    }

    pub fn spend_amount(&self) -> Option<f64> {
        self.spend.map(|s| s.amount())
    }
}
