//! Definitions for the page's input controls.
//!
//! The page builds its dropdown, sliders and checklist from these so the
//! option values always match what [`crate::view::Interaction`] expects.

use serde::Serialize;
use timeline_types::{Category, TimeRange};

use crate::filter::{AxisRange, CategoryFilter};
use crate::view::{Lane, ViewState};

pub const RANGE_STEP: i32 = 10;
pub const RANGE_MARK_STEP: usize = 500;

/// `公元前221年` for BCE years, `1911年` otherwise.
pub fn format_year(year: i32) -> String {
    if year < 0 {
        format!("公元前{}年", year.unsigned_abs())
    } else {
        format!("{year}年")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    fn new(label: &str, value: &str) -> Self {
        SelectOption {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub min: u8,
    pub max: u8,
    pub step: u8,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    pub year: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub value: AxisRange,
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controls {
    pub category_options: Vec<SelectOption>,
    pub category: String,
    pub importance: Slider,
    pub time_range: RangeSlider,
    pub display_options: Vec<SelectOption>,
    pub display: Vec<Lane>,
    pub search: String,
}

impl Controls {
    /// Control definitions with values taken from the current view state.
    pub fn new(full: TimeRange, state: &ViewState) -> Self {
        let mut category_options = vec![SelectOption::new("全部", CategoryFilter::ALL_VALUE)];
        category_options.extend(
            Category::ALL
                .iter()
                .filter(|c| **c != Category::Other)
                .map(|c| SelectOption::new(c.as_chinese(), c.as_chinese())),
        );

        let marks = (full.min_year..=full.max_year)
            .step_by(RANGE_MARK_STEP)
            .map(|year| Mark {
                year,
                label: format_year(year),
            })
            .collect();

        let display_options = Lane::ALL
            .iter()
            .map(|l| SelectOption::new(l.label(), l.as_str()))
            .collect();

        Controls {
            category_options,
            category: state.filters.category.as_value().to_string(),
            importance: Slider {
                min: 1,
                max: 5,
                step: 1,
                value: state.filters.min_importance.unwrap_or(1),
            },
            time_range: RangeSlider {
                min: full.min_year,
                max: full.max_year,
                step: RANGE_STEP,
                value: state.filters.range,
                marks,
            },
            display_options,
            display: state.visibility.shown(),
            search: state.filters.search.clone().unwrap_or_default(),
        }
    }
}
