//! Shared data model for the consolidated timeline document.
//!
//! `timeline_data.json` is produced once by `history_timeline process` and
//! read back by the server; both sides go through these types.

use serde::{Deserialize, Serialize};

// ── Record tag ───────────────────────────────────────────────────────────

/// The `type` tag carried by every record in the JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Dynasty,
    Event,
    Figure,
}

// ── Event category ───────────────────────────────────────────────────────

/// Closed set of event categories, keyed by their Chinese label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "政治")]
    Political,
    #[serde(rename = "军事")]
    Military,
    #[serde(rename = "文化")]
    Cultural,
    #[serde(rename = "经济")]
    Economic,
    #[serde(rename = "科技")]
    Scientific,
    #[serde(rename = "其他")]
    Other,
}

impl Category {
    /// Display order used by the category dropdown.
    pub const ALL: [Category; 6] = [
        Self::Political,
        Self::Military,
        Self::Cultural,
        Self::Economic,
        Self::Scientific,
        Self::Other,
    ];

    pub fn as_chinese(&self) -> &'static str {
        match self {
            Self::Political => "政治",
            Self::Military => "军事",
            Self::Cultural => "文化",
            Self::Economic => "经济",
            Self::Scientific => "科技",
            Self::Other => "其他",
        }
    }

    pub fn from_chinese(label: &str) -> Option<Self> {
        match label {
            "政治" => Some(Self::Political),
            "军事" => Some(Self::Military),
            "文化" => Some(Self::Cultural),
            "经济" => Some(Self::Economic),
            "科技" => Some(Self::Scientific),
            "其他" => Some(Self::Other),
            _ => None,
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────────

/// A ruling period drawn as a band on the dynasty lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dynasty {
    /// The dynasty name doubles as its identifier.
    pub id: String,
    pub start_year: i32,
    pub end_year: i32,
    /// Always `end_year - start_year`.
    pub duration: i32,
    pub description: String,
    /// CSS color used to fill the band.
    pub color: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
}

/// A point-in-time occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// `event_<row>`, taken from the row position in the source table.
    pub id: String,
    pub year: i32,
    pub title: String,
    pub description: String,
    /// Dynasty name; not checked against the dynasty table.
    pub dynasty: String,
    /// 1 (minor) to 5 (major).
    pub importance: u8,
    /// Chinese category label, normally one of [`Category::ALL`].
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: RecordKind,
}

impl Event {
    /// Resolved category, `None` when the label is not a known one.
    pub fn category_kind(&self) -> Option<Category> {
        Category::from_chinese(&self.category)
    }
}

/// A historical person, drawn as a lifeline on the figure lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// `figure_<row>`, taken from the row position in the source table.
    pub id: String,
    pub name: String,
    pub birth_year: i32,
    pub death_year: i32,
    pub dynasty: String,
    pub description: String,
    pub importance: u8,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: RecordKind,
}

// ── Time range ───────────────────────────────────────────────────────────

/// Inclusive year span covering every record in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub min_year: i32,
    pub max_year: i32,
}

impl TimeRange {
    /// Smallest range covering all `years`; `None` for an empty iterator.
    pub fn covering(years: impl IntoIterator<Item = i32>) -> Option<Self> {
        years.into_iter().fold(None, |acc, y| match acc {
            None => Some(TimeRange {
                min_year: y,
                max_year: y,
            }),
            Some(r) => Some(TimeRange {
                min_year: r.min_year.min(y),
                max_year: r.max_year.max(y),
            }),
        })
    }
}

// ── JSON document ────────────────────────────────────────────────────────

/// The consolidated dataset: `timeline_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    pub dynasties: Vec<Dynasty>,
    pub events: Vec<Event>,
    pub figures: Vec<Figure>,
    pub time_range: TimeRange,
}

impl TimelineData {
    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn figure(&self, id: &str) -> Option<&Figure> {
        self.figures.iter().find(|f| f.id == id)
    }
}
