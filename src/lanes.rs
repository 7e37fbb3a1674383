//! Chart descriptions for the three timeline lanes.
//!
//! Each lane is a plotly-compatible `{data, layout}` object. The page
//! passes it to the charting library untouched, so everything visual
//! (sizes, colors, stacking order, axis range) is decided here.

use serde::Serialize;
use timeline_types::{Category, Dynasty, Event, Figure, TimeRange, TimelineData};

use crate::filter::{AxisRange, Filters};

// ── Palette ──────────────────────────────────────────────────────────

pub const BACKGROUND: &str = "#111111";
pub const TEXT: &str = "#FFFFFF";
pub const PRIMARY: &str = "#375A7F";
/// Event color for categories outside the known set.
pub const DEFAULT_EVENT_COLOR: &str = "#E74C3C";
const FONT_FAMILY: &str = "\"ZCOOL XiaoWei\", serif";

pub const EVENT_SIZE_SCALE: f64 = 8.0;
pub const FIGURE_LINE_SCALE: f64 = 1.5;
pub const FIGURE_MARKER_SCALE: f64 = 4.0;
/// Only dynasties lasting longer than this get a centered label.
pub const LABEL_MIN_DURATION: i32 = 50;
pub const REFERENCE_STEP: usize = 100;
pub const FIGURE_ROWS: usize = 3;

pub fn category_color(label: &str) -> &'static str {
    match Category::from_chinese(label) {
        Some(Category::Political) => "#FF5733",
        Some(Category::Military) => "#C70039",
        Some(Category::Cultural) => "#FFC300",
        Some(Category::Economic) => "#DAF7A6",
        Some(Category::Scientific) => "#3498DB",
        Some(Category::Other) => "#9B59B6",
        None => DEFAULT_EVENT_COLOR,
    }
}

// ── Figure description ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: f64,
    pub color: String,
    pub symbol: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub hoverinfo: &'static str,
    /// Record id delivered with click events.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub customdata: Vec<String>,
    pub showlegend: bool,
}

impl Trace {
    fn scatter(x: Vec<f64>, y: Vec<f64>) -> Self {
        Trace {
            kind: "scatter",
            x,
            y,
            mode: None,
            fill: None,
            fillcolor: None,
            line: None,
            marker: None,
            name: None,
            text: None,
            hoverinfo: "text",
            customdata: Vec::new(),
            showlegend: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: &'static str,
    pub size: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub showarrow: bool,
    pub font: Font,
    pub bgcolor: &'static str,
    pub bordercolor: &'static str,
    pub borderwidth: u32,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub range: AxisRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    pub showgrid: bool,
    pub showticklabels: bool,
    pub zeroline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<&'static str>,
}

impl Axis {
    fn years(range: AxisRange, title: Option<&'static str>) -> Self {
        Axis {
            range,
            title,
            showgrid: true,
            showticklabels: true,
            zeroline: false,
            tickformat: Some(".0f"),
        }
    }

    /// Hidden 0..1 band axis shared by all lanes.
    fn band() -> Self {
        Axis {
            range: AxisRange(-0.1, 1.1),
            title: None,
            showgrid: false,
            showticklabels: false,
            zeroline: false,
            tickformat: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub height: u32,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub font: Font,
    pub hovermode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dragmode: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Layout {
    fn lane(height: u32, window: AxisRange, title: Option<&'static str>) -> Self {
        Layout {
            height,
            xaxis: Axis::years(window, title),
            yaxis: Axis::band(),
            plot_bgcolor: BACKGROUND,
            paper_bgcolor: BACKGROUND,
            font: Font {
                family: FONT_FAMILY,
                size: 14,
                color: TEXT,
            },
            hovermode: "closest",
            dragmode: None,
            shapes: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// One lane's chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneFigure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// All three lanes, always rendered over the same x window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lanes {
    pub dynasties: LaneFigure,
    pub events: LaneFigure,
    pub figures: LaneFigure,
}

impl Lanes {
    pub fn ranges(&self) -> [AxisRange; 3] {
        [
            self.dynasties.layout.xaxis.range,
            self.events.layout.xaxis.range,
            self.figures.layout.xaxis.range,
        ]
    }
}

// ── Dynasty lane ─────────────────────────────────────────────────────

/// Years that get a vertical reference line: every 100 years starting at
/// the dataset minimum.
pub fn reference_years(full: TimeRange) -> impl Iterator<Item = i32> {
    (full.min_year..=full.max_year).step_by(REFERENCE_STEP)
}

fn reference_line(year: i32) -> Shape {
    let line = if year == 0 {
        Line {
            color: "red".into(),
            width: 2.0,
            dash: Some("dash"),
        }
    } else {
        Line {
            color: "rgba(255, 255, 255, 0.2)".into(),
            width: 1.0,
            dash: None,
        }
    };
    Shape {
        kind: "line",
        x0: f64::from(year),
        y0: 0.0,
        x1: f64::from(year),
        y1: 1.0,
        line,
    }
}

pub fn dynasty_lane(dynasties: &[Dynasty], full: TimeRange, window: AxisRange) -> LaneFigure {
    let data = dynasties
        .iter()
        .map(|d| {
            let (s, e) = (f64::from(d.start_year), f64::from(d.end_year));
            let mut t = Trace::scatter(vec![s, e, e, s, s], vec![0.0, 0.0, 1.0, 1.0, 0.0]);
            t.fill = Some("toself");
            t.fillcolor = Some(d.color.clone());
            t.line = Some(Line {
                color: d.color.clone(),
                width: 0.0,
                dash: None,
            });
            t.name = Some(d.id.clone());
            t.text = Some(format!("{} ({}年 - {}年)", d.id, d.start_year, d.end_year));
            t
        })
        .collect();

    let annotations = dynasties
        .iter()
        .filter(|d| d.duration > LABEL_MIN_DURATION)
        .map(|d| Annotation {
            x: (f64::from(d.start_year) + f64::from(d.end_year)) / 2.0,
            y: 0.5,
            text: d.id.clone(),
            showarrow: false,
            font: Font {
                family: FONT_FAMILY,
                size: 14,
                color: "black",
            },
            bgcolor: "rgba(255, 255, 255, 0.7)",
            bordercolor: "black",
            borderwidth: 1,
            opacity: 0.8,
        })
        .collect();

    let mut layout = Layout::lane(250, window, Some("年份"));
    layout.dragmode = Some("pan");
    layout.annotations = annotations;
    layout.shapes = reference_years(full).map(reference_line).collect();

    LaneFigure { data, layout }
}

// ── Event lane ───────────────────────────────────────────────────────

/// Stable sort, most important first.
fn by_importance_desc<'a, T>(items: &[&'a T], importance: impl Fn(&T) -> u8) -> Vec<&'a T> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| std::cmp::Reverse(importance(*item)));
    sorted
}

pub fn event_lane(events: &[&Event], window: AxisRange) -> LaneFigure {
    let data = by_importance_desc(events, |e| e.importance)
        .into_iter()
        .map(|e| {
            let mut t = Trace::scatter(vec![f64::from(e.year)], vec![0.5]);
            t.mode = Some("markers");
            t.marker = Some(Marker {
                size: f64::from(e.importance) * EVENT_SIZE_SCALE,
                color: category_color(&e.category).to_string(),
                symbol: "diamond",
                opacity: Some(0.8),
                line: Line {
                    color: "white".into(),
                    width: 2.0,
                    dash: None,
                },
            });
            t.name = Some(e.title.clone());
            t.text = Some(format!(
                "{} ({}年)<br>{}<br>分类: {}",
                e.title, e.year, e.description, e.category
            ));
            t.customdata = vec![e.id.clone()];
            t
        })
        .collect();

    LaneFigure {
        data,
        layout: Layout::lane(150, window, None),
    }
}

// ── Figure lane ──────────────────────────────────────────────────────

/// Vertical position of the `index`-th figure after sorting.
pub fn figure_row_y(index: usize) -> f64 {
    0.2 + (index % FIGURE_ROWS) as f64 * 0.3
}

pub fn figure_lane(figures: &[&Figure], window: AxisRange) -> LaneFigure {
    let mut data = Vec::with_capacity(figures.len() * 2);

    for (i, f) in by_importance_desc(figures, |f| f.importance)
        .into_iter()
        .enumerate()
    {
        let y = figure_row_y(i);
        let importance = f64::from(f.importance);

        let mut life = Trace::scatter(
            vec![f64::from(f.birth_year), f64::from(f.death_year)],
            vec![y, y],
        );
        life.mode = Some("lines");
        life.line = Some(Line {
            color: PRIMARY.into(),
            width: importance * FIGURE_LINE_SCALE,
            dash: Some("solid"),
        });
        life.name = Some(f.name.clone());
        life.text = Some(format!(
            "{} ({}年 - {}年)<br>{}",
            f.name, f.birth_year, f.death_year, f.description
        ));
        life.customdata = vec![f.id.clone(), f.id.clone()];
        data.push(life);

        let mut birth = Trace::scatter(vec![f64::from(f.birth_year)], vec![y]);
        birth.mode = Some("markers");
        birth.marker = Some(Marker {
            size: importance * FIGURE_MARKER_SCALE,
            color: PRIMARY.into(),
            symbol: "circle",
            opacity: None,
            line: Line {
                color: "white".into(),
                width: 1.0,
                dash: None,
            },
        });
        // tooltip comes from the lifeline; "skip" would also drop clicks
        birth.hoverinfo = "none";
        birth.customdata = vec![f.id.clone()];
        data.push(birth);
    }

    LaneFigure {
        data,
        layout: Layout::lane(200, window, None),
    }
}

// ── All lanes ────────────────────────────────────────────────────────

/// Filter events and figures, then build every lane over `window`.
///
/// The window only sets the x-axis range; records outside it are still
/// sent so panning never changes which figure sits on which row.
pub fn render_lanes(data: &TimelineData, filters: &Filters, window: AxisRange) -> Lanes {
    let events = filters.events(&data.events);
    let figures = filters.figures(&data.figures);

    Lanes {
        dynasties: dynasty_lane(&data.dynasties, data.time_range, window),
        events: event_lane(&events, window),
        figures: figure_lane(&figures, window),
    }
}
