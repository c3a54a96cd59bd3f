use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment label attached to an article at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tonality {
    Positive,
    Neutral,
    Negative,
}

impl Tonality {
    pub const ALL: [Tonality; 3] = [Tonality::Positive, Tonality::Neutral, Tonality::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tonality::Positive => "positive",
            Tonality::Neutral => "neutral",
            Tonality::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Tonality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tonality {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tonality::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::Error::Computation(format!("unknown tonality: {s}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub content: String,
    pub link: String,
    pub img: String,
    pub language: String,
    pub department: String,
    pub source: String,
    pub publication_date: DateTime<Utc>,
    pub tonality: Tonality,
    pub score: f64,
}

/// One (tonality name, percentage) pair inside a persisted snapshot.
///
/// The name is kept as a free string on purpose: reconstruction matches it
/// against the known tonality names and silently drops anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub percentage: f64,
}

/// Daily aggregate of tonality percentages, keyed by the calendar day of
/// `date`. Append-only from the caller's point of view; the store replaces
/// an existing snapshot for the same day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: DateTime<Utc>,
    pub tonality: Vec<SnapshotEntry>,
}

/// One row of the computed tonality distribution. `index` is 1-based and
/// only exists for display numbering, it carries no identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TonalityShare {
    pub index: usize,
    pub tonality: Tonality,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub name: String,
    pub count: u64,
}

/// Per-tonality percentage series for one Monday-to-Sunday window, values
/// pre-formatted to 3 decimal places. Derived on request, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySeries {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub neutral: Vec<String>,
}

/// Chart-facing shape of one series, `[{name, data}]` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<String>,
}

impl From<WeeklySeries> for Vec<ChartSeries> {
    fn from(series: WeeklySeries) -> Self {
        vec![
            ChartSeries {
                name: "positive".to_string(),
                data: series.positive,
            },
            ChartSeries {
                name: "negative".to_string(),
                data: series.negative,
            },
            ChartSeries {
                name: "neutral".to_string(),
                data: series.neutral,
            },
        ]
    }
}

/// Summary handed to the digest notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestSummary {
    pub negative_count: u64,
    pub negative_percentage: f64,
    pub positive_percentage: f64,
    pub neutral_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub department: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(skip_serializing, default)]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        full_name: String,
        department: String,
        avatar: Option<String>,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            email,
            full_name,
            department,
            avatar,
            password_hash,
            refresh_token: None,
            created_at,
        }
    }
}
