//! Record filters for the event and figure lanes.
//!
//! Only search, category and importance remove records. The year window
//! (range control or zoom) sets the lanes' x-axis and nothing else, so
//! figure rows stay put while panning. Dynasties are never filtered.

use serde::{Deserialize, Serialize};
use timeline_types::{Event, Figure, TimeRange};

// ── Year window ──────────────────────────────────────────────────────

/// An x-axis window in years, serialized as `[start, end]`.
///
/// Zoom gestures report fractional years, so this is `f64` even though
/// every record year is an integer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange(pub f64, pub f64);

impl From<TimeRange> for AxisRange {
    fn from(r: TimeRange) -> Self {
        AxisRange(f64::from(r.min_year), f64::from(r.max_year))
    }
}

// ── Category filter ──────────────────────────────────────────────────

/// Dropdown value: `"all"` or one exact category label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub const ALL_VALUE: &'static str = "all";

    pub fn from_value(value: &str) -> Self {
        if value.is_empty() || value == Self::ALL_VALUE {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn as_value(&self) -> &str {
        match self {
            Self::All => Self::ALL_VALUE,
            Self::Only(label) => label,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Only(label) => event.category == *label,
        }
    }
}

// ── Combined filter state ────────────────────────────────────────────

/// Current values of the filter controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    /// Raw search box content.
    pub search: Option<String>,
    pub category: CategoryFilter,
    pub min_importance: Option<u8>,
    /// Range-control value. Sets the axis only; a zoom gesture can
    /// override it for rendering.
    pub range: AxisRange,
}

impl Filters {
    /// Controls at their initial positions: everything passes.
    pub fn new(time_range: TimeRange) -> Self {
        Filters {
            search: None,
            category: CategoryFilter::All,
            min_importance: None,
            range: time_range.into(),
        }
    }

    /// Lower-cased search term, `None` when the box is empty.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn meets_importance(&self, importance: u8) -> bool {
        self.min_importance.is_none_or(|min| importance >= min)
    }

    pub fn event_matches(&self, event: &Event) -> bool {
        let text_ok = self.needle().is_none_or(|n| {
            [&event.title, &event.description, &event.dynasty]
                .iter()
                .any(|field| field.to_lowercase().contains(&n))
        });
        text_ok && self.category.matches(event) && self.meets_importance(event.importance)
    }

    /// Figures ignore the category filter.
    pub fn figure_matches(&self, figure: &Figure) -> bool {
        let text_ok = self.needle().is_none_or(|n| {
            [&figure.name, &figure.description, &figure.dynasty]
                .iter()
                .any(|field| field.to_lowercase().contains(&n))
        });
        text_ok && self.meets_importance(figure.importance)
    }

    pub fn events<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.event_matches(e)).collect()
    }

    pub fn figures<'a>(&self, figures: &'a [Figure]) -> Vec<&'a Figure> {
        figures.iter().filter(|f| self.figure_matches(f)).collect()
    }
}
