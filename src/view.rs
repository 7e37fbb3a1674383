//! Timeline view controller.
//!
//! All user input arrives as an [`Interaction`]. [`TimelineController::dispatch`]
//! folds it into the [`ViewState`] and reports which page outputs changed:
//!
//! - filter and range-control changes re-render the lanes over the control
//!   range;
//! - a zoom/pan gesture on any lane re-renders all three lanes over the
//!   gesture's x range;
//! - clicks only touch the detail panel;
//! - the display checklist only touches lane visibility.
//!
//! The selected record is copied into the state at click time, so the
//! detail panel keeps showing it even after filters hide it from view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use timeline_types::{Event, Figure, TimelineData};
use tracing::{debug, warn};

use crate::controls::Controls;
use crate::filter::{AxisRange, CategoryFilter, Filters};
use crate::lanes::{self, Lanes};

pub const PLACEHOLDER: &str = "点击时间轴上的事件或人物查看详细信息";

// ── Lanes and visibility ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Dynasties,
    Events,
    Figures,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Self::Dynasties, Self::Events, Self::Figures];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynasties => "dynasties",
            Self::Events => "events",
            Self::Figures => "figures",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dynasties => "朝代",
            Self::Events => "事件",
            Self::Figures => "人物",
        }
    }
}

/// Which lane containers are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub dynasties: bool,
    pub events: bool,
    pub figures: bool,
}

impl Visibility {
    pub fn all() -> Self {
        Visibility {
            dynasties: true,
            events: true,
            figures: true,
        }
    }

    pub fn from_lanes(lanes: &[Lane]) -> Self {
        Visibility {
            dynasties: lanes.contains(&Lane::Dynasties),
            events: lanes.contains(&Lane::Events),
            figures: lanes.contains(&Lane::Figures),
        }
    }

    pub fn is_shown(&self, lane: Lane) -> bool {
        match lane {
            Lane::Dynasties => self.dynasties,
            Lane::Events => self.events,
            Lane::Figures => self.figures,
        }
    }

    pub fn shown(&self) -> Vec<Lane> {
        Lane::ALL.into_iter().filter(|l| self.is_shown(*l)).collect()
    }
}

// ── Selection ────────────────────────────────────────────────────────

/// Detail-panel state machine. Holds the full record captured at click
/// time; it is never looked up again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "item", rename_all = "snake_case")]
pub enum Selection {
    Unselected,
    ShowingEvent(Event),
    ShowingFigure(Figure),
}

impl Selection {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::ShowingEvent(e) => Some(&e.id),
            Self::ShowingFigure(f) => Some(&f.id),
        }
    }
}

/// Rendered detail panel content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailView {
    Placeholder {
        message: String,
    },
    Item {
        id: String,
        heading: String,
        image_url: Option<String>,
        description: String,
        dynasty: String,
    },
}

impl DetailView {
    pub fn for_selection(selection: &Selection) -> Self {
        match selection {
            Selection::Unselected => DetailView::Placeholder {
                message: PLACEHOLDER.to_string(),
            },
            Selection::ShowingEvent(e) => DetailView::Item {
                id: e.id.clone(),
                heading: format!("{} ({}年)", e.title, e.year),
                image_url: e.image_url.clone(),
                description: e.description.clone(),
                dynasty: format!("朝代: {}", e.dynasty),
            },
            Selection::ShowingFigure(f) => DetailView::Item {
                id: f.id.clone(),
                heading: format!("{} ({}-{})", f.name, f.birth_year, f.death_year),
                image_url: f.image_url.clone(),
                description: f.description.clone(),
                dynasty: format!("朝代: {}", f.dynasty),
            },
        }
    }
}

// ── Interactions ─────────────────────────────────────────────────────

/// The subset of a plotly `relayout` payload the controller reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Relayout {
    #[serde(rename = "xaxis.range[0]", default)]
    pub range_start: Option<f64>,
    #[serde(rename = "xaxis.range[1]", default)]
    pub range_end: Option<f64>,
}

impl Relayout {
    /// Both ends must be reported; an autorange reset reports neither.
    pub fn x_range(&self) -> Option<AxisRange> {
        Some(AxisRange(self.range_start?, self.range_end?))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    Search {
        #[serde(default)]
        term: Option<String>,
    },
    Category {
        value: String,
    },
    MinImportance {
        #[serde(default)]
        value: Option<u8>,
    },
    TimeRange {
        value: AxisRange,
    },
    /// Zoom or pan on one lane.
    Relayout {
        lane: Lane,
        #[serde(default)]
        data: Relayout,
    },
    Click {
        lane: Lane,
        id: String,
    },
    Display {
        lanes: Vec<Lane>,
    },
    /// Back to the initial state: no filters, no zoom, nothing selected.
    Reset,
}

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub filters: Filters,
    /// Set only while the latest lane-affecting interaction was a zoom.
    pub zoom: Option<AxisRange>,
    pub selection: Selection,
    pub visibility: Visibility,
}

impl ViewState {
    pub fn initial(full: timeline_types::TimeRange) -> Self {
        ViewState {
            filters: Filters::new(full),
            zoom: None,
            selection: Selection::Unselected,
            visibility: Visibility::all(),
        }
    }

    /// The x window every lane renders over.
    pub fn window(&self) -> AxisRange {
        self.zoom.unwrap_or(self.filters.range)
    }
}

/// Outputs changed by one interaction; `None` means leave as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Update {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lanes: Option<Lanes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Everything the page needs on first load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub lanes: Lanes,
    pub detail: DetailView,
    pub visibility: Visibility,
    pub controls: Controls,
}

// ── Controller ───────────────────────────────────────────────────────

pub struct TimelineController {
    data: Arc<TimelineData>,
    state: ViewState,
}

impl TimelineController {
    pub fn new(data: Arc<TimelineData>) -> Self {
        let state = ViewState::initial(data.time_range);
        TimelineController { data, state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn lanes(&self) -> Lanes {
        lanes::render_lanes(&self.data, &self.state.filters, self.state.window())
    }

    pub fn detail(&self) -> DetailView {
        DetailView::for_selection(&self.state.selection)
    }

    pub fn render(&self) -> View {
        View {
            lanes: self.lanes(),
            detail: self.detail(),
            visibility: self.state.visibility,
            controls: Controls::new(self.data.time_range, &self.state),
        }
    }

    pub fn dispatch(&mut self, interaction: Interaction) -> Update {
        match interaction {
            Interaction::Search { term } => {
                self.state.filters.search = term;
                self.refilter()
            }
            Interaction::Category { value } => {
                self.state.filters.category = CategoryFilter::from_value(&value);
                self.refilter()
            }
            Interaction::MinImportance { value } => {
                self.state.filters.min_importance = value;
                self.refilter()
            }
            Interaction::TimeRange { value } => {
                self.state.filters.range = value;
                self.refilter()
            }
            Interaction::Relayout { lane, data } => {
                self.state.zoom = data.x_range();
                debug!(lane = lane.as_str(), zoom = ?self.state.zoom, "lane relayout");
                self.lanes_update()
            }
            Interaction::Click { lane, id } => self.select(lane, &id),
            Interaction::Display { lanes } => {
                self.state.visibility = Visibility::from_lanes(&lanes);
                Update {
                    visibility: Some(self.state.visibility),
                    ..Update::default()
                }
            }
            Interaction::Reset => {
                self.state = ViewState::initial(self.data.time_range);
                Update {
                    lanes: Some(self.lanes()),
                    detail: Some(self.detail()),
                    visibility: Some(self.state.visibility),
                }
            }
        }
    }

    /// A filter control changed: the control range is authoritative again.
    fn refilter(&mut self) -> Update {
        self.state.zoom = None;
        self.lanes_update()
    }

    fn lanes_update(&self) -> Update {
        Update {
            lanes: Some(self.lanes()),
            ..Update::default()
        }
    }

    fn select(&mut self, lane: Lane, id: &str) -> Update {
        let next = match lane {
            Lane::Events => self.data.event(id).cloned().map(Selection::ShowingEvent),
            Lane::Figures => self.data.figure(id).cloned().map(Selection::ShowingFigure),
            Lane::Dynasties => {
                debug!(id, "dynasty lane clicks carry no detail");
                return Update::default();
            }
        };

        match next {
            Some(selection) => {
                debug!(from = ?self.state.selection.id(), to = ?selection.id(), "selection changed");
                self.state.selection = selection;
                Update {
                    detail: Some(self.detail()),
                    ..Update::default()
                }
            }
            None => {
                warn!(lane = lane.as_str(), id, "click on unknown record ignored");
                Update::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::figure_row_y;
    use timeline_types::{Dynasty, RecordKind, TimeRange};

    fn dataset() -> Arc<TimelineData> {
        let dynasties = vec![Dynasty {
            id: "唐".into(),
            start_year: 618,
            end_year: 907,
            duration: 289,
            description: "唐朝".into(),
            color: "#FFD700".into(),
            kind: RecordKind::Dynasty,
        }];
        let events = vec![
            Event {
                id: "event_0".into(),
                year: 618,
                title: "唐朝建立".into(),
                description: "李渊称帝".into(),
                dynasty: "唐".into(),
                importance: 5,
                category: "政治".into(),
                image_url: Some("https://example.org/tang.png".into()),
                kind: RecordKind::Event,
            },
            Event {
                id: "event_1".into(),
                year: 755,
                title: "安史之乱".into(),
                description: "安禄山起兵".into(),
                dynasty: "唐".into(),
                importance: 2,
                category: "军事".into(),
                image_url: None,
                kind: RecordKind::Event,
            },
        ];
        let figures = vec![Figure {
            id: "figure_0".into(),
            name: "李白".into(),
            birth_year: 701,
            death_year: 762,
            dynasty: "唐".into(),
            description: "诗人".into(),
            importance: 4,
            image_url: None,
            kind: RecordKind::Figure,
        }];
        Arc::new(TimelineData {
            dynasties,
            events,
            figures,
            time_range: TimeRange {
                min_year: 618,
                max_year: 907,
            },
        })
    }

    fn click(lane: Lane, id: &str) -> Interaction {
        Interaction::Click {
            lane,
            id: id.into(),
        }
    }

    fn zoom(lane: Lane, start: f64, end: f64) -> Interaction {
        Interaction::Relayout {
            lane,
            data: Relayout {
                range_start: Some(start),
                range_end: Some(end),
            },
        }
    }

    fn event_ids(lanes: &Lanes) -> Vec<String> {
        lanes
            .events
            .data
            .iter()
            .map(|t| t.customdata[0].clone())
            .collect()
    }

    #[test]
    fn test_initial_state_shows_placeholder() {
        let c = TimelineController::new(dataset());
        assert_eq!(c.state().selection, Selection::Unselected);
        assert_eq!(
            c.detail(),
            DetailView::Placeholder {
                message: PLACEHOLDER.into()
            }
        );
        assert_eq!(c.lanes().ranges(), [AxisRange(618.0, 907.0); 3]);
    }

    #[test]
    fn test_click_event_shows_detail() {
        let mut c = TimelineController::new(dataset());
        let update = c.dispatch(click(Lane::Events, "event_0"));
        assert!(update.lanes.is_none());
        assert_eq!(
            update.detail,
            Some(DetailView::Item {
                id: "event_0".into(),
                heading: "唐朝建立 (618年)".into(),
                image_url: Some("https://example.org/tang.png".into()),
                description: "李渊称帝".into(),
                dynasty: "朝代: 唐".into(),
            })
        );
        assert_eq!(c.state().selection.id(), Some("event_0"));
    }

    #[test]
    fn test_click_figure_shows_detail() {
        let mut c = TimelineController::new(dataset());
        c.dispatch(click(Lane::Events, "event_0"));
        let update = c.dispatch(click(Lane::Figures, "figure_0"));
        match update.detail {
            Some(DetailView::Item { heading, image_url, .. }) => {
                assert_eq!(heading, "李白 (701-762)");
                assert_eq!(image_url, None);
            }
            other => panic!("unexpected detail: {other:?}"),
        }
        assert!(matches!(c.state().selection, Selection::ShowingFigure(_)));
    }

    #[test]
    fn test_selection_survives_filter_that_hides_it() {
        let mut c = TimelineController::new(dataset());
        c.dispatch(click(Lane::Events, "event_1"));
        let before = c.detail();

        let update = c.dispatch(Interaction::Category {
            value: "政治".into(),
        });
        let lanes = update.lanes.unwrap();
        assert_eq!(event_ids(&lanes), ["event_0"]);
        assert!(update.detail.is_none());
        assert_eq!(c.detail(), before);
        assert_eq!(c.state().selection.id(), Some("event_1"));

        c.dispatch(zoom(Lane::Dynasties, 800.0, 900.0));
        assert_eq!(c.detail(), before);
    }

    #[test]
    fn test_unknown_click_keeps_selection() {
        let mut c = TimelineController::new(dataset());
        c.dispatch(click(Lane::Figures, "figure_0"));
        let update = c.dispatch(click(Lane::Events, "event_99"));
        assert_eq!(update, Update::default());
        assert_eq!(c.state().selection.id(), Some("figure_0"));

        let update = c.dispatch(click(Lane::Dynasties, "唐"));
        assert_eq!(update, Update::default());
    }

    #[test]
    fn test_importance_filter_hits_events_not_unaffected_figures() {
        let mut c = TimelineController::new(dataset());
        let lanes = c
            .dispatch(Interaction::MinImportance { value: Some(3) })
            .lanes
            .unwrap();
        assert_eq!(event_ids(&lanes), ["event_0"]);
        // figure_0 has importance 4: lifeline + birth marker
        assert_eq!(lanes.figures.data.len(), 2);
    }

    #[test]
    fn test_zoom_on_one_lane_reranges_all_three() {
        let mut c = TimelineController::new(dataset());
        let lanes = c.dispatch(zoom(Lane::Events, 600.0, 900.0)).lanes.unwrap();
        assert_eq!(lanes.ranges(), [AxisRange(600.0, 900.0); 3]);
        assert_eq!(c.lanes().ranges(), [AxisRange(600.0, 900.0); 3]);

        let lanes = c.dispatch(zoom(Lane::Figures, 700.0, 760.0)).lanes.unwrap();
        assert_eq!(lanes.ranges(), [AxisRange(700.0, 760.0); 3]);
        // the window moves the axis; both events are still sent
        assert_eq!(event_ids(&lanes), ["event_0", "event_1"]);
    }

    fn lifeline_y(lanes: &Lanes, id: &str) -> Option<f64> {
        lanes
            .figures
            .data
            .iter()
            .find(|t| t.mode == Some("lines") && t.customdata.first().map(String::as_str) == Some(id))
            .map(|t| t.y[0])
    }

    #[test]
    fn test_figure_rows_stable_under_zoom_and_range() {
        let mut data = TimelineData::clone(&dataset());
        data.events = vec![Event {
            id: "event_0".into(),
            year: 100,
            ..data.events[0].clone()
        }];
        data.figures = vec![
            Figure {
                id: "figure_0".into(),
                birth_year: 0,
                death_year: 50,
                importance: 5,
                ..data.figures[0].clone()
            },
            Figure {
                id: "figure_1".into(),
                birth_year: 700,
                death_year: 760,
                importance: 4,
                ..data.figures[0].clone()
            },
        ];
        data.time_range = TimeRange {
            min_year: 0,
            max_year: 907,
        };
        let mut c = TimelineController::new(Arc::new(data));

        let before = c.lanes();
        assert_eq!(lifeline_y(&before, "figure_1"), Some(figure_row_y(1)));

        let zoomed = c.dispatch(zoom(Lane::Events, 600.0, 900.0)).lanes.unwrap();
        assert_eq!(lifeline_y(&zoomed, "figure_1"), lifeline_y(&before, "figure_1"));
        assert_eq!(lifeline_y(&zoomed, "figure_0"), lifeline_y(&before, "figure_0"));
        assert_eq!(event_ids(&zoomed), ["event_0"]);

        let ranged = c
            .dispatch(Interaction::TimeRange {
                value: AxisRange(500.0, 1000.0),
            })
            .lanes
            .unwrap();
        assert_eq!(ranged.ranges(), [AxisRange(500.0, 1000.0); 3]);
        assert_eq!(event_ids(&ranged), ["event_0"]);
        assert_eq!(lifeline_y(&ranged, "figure_1"), lifeline_y(&before, "figure_1"));
    }

    #[test]
    fn test_filter_change_after_zoom_restores_control_range() {
        let mut c = TimelineController::new(dataset());
        c.dispatch(Interaction::TimeRange {
            value: AxisRange(650.0, 850.0),
        });
        c.dispatch(zoom(Lane::Dynasties, 700.0, 710.0));
        let lanes = c
            .dispatch(Interaction::Search {
                term: Some("李".into()),
            })
            .lanes
            .unwrap();
        assert_eq!(lanes.ranges(), [AxisRange(650.0, 850.0); 3]);
    }

    #[test]
    fn test_autorange_relayout_falls_back_to_control() {
        let mut c = TimelineController::new(dataset());
        c.dispatch(zoom(Lane::Events, 700.0, 710.0));
        let lanes = c
            .dispatch(Interaction::Relayout {
                lane: Lane::Events,
                data: Relayout::default(),
            })
            .lanes
            .unwrap();
        assert_eq!(lanes.ranges(), [AxisRange(618.0, 907.0); 3]);
    }

    #[test]
    fn test_click_does_not_reset_zoom() {
        let mut c = TimelineController::new(dataset());
        c.dispatch(zoom(Lane::Events, 700.0, 800.0));
        c.dispatch(click(Lane::Events, "event_0"));
        assert_eq!(c.state().window(), AxisRange(700.0, 800.0));
    }

    #[test]
    fn test_display_toggle_touches_only_visibility() {
        let mut c = TimelineController::new(dataset());
        let update = c.dispatch(Interaction::Display {
            lanes: vec![Lane::Events],
        });
        assert!(update.lanes.is_none());
        assert!(update.detail.is_none());
        let v = update.visibility.unwrap();
        assert!(!v.dynasties && v.events && !v.figures);
        assert_eq!(c.render().controls.display, [Lane::Events]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut c = TimelineController::new(dataset());
        c.dispatch(click(Lane::Events, "event_0"));
        c.dispatch(zoom(Lane::Events, 700.0, 800.0));
        c.dispatch(Interaction::Display { lanes: vec![] });
        let update = c.dispatch(Interaction::Reset);
        assert_eq!(c.state(), &ViewState::initial(dataset().time_range));
        assert!(matches!(update.detail, Some(DetailView::Placeholder { .. })));
        assert_eq!(update.visibility, Some(Visibility::all()));
    }

    #[test]
    fn test_interaction_wire_format() {
        let i: Interaction = serde_json::from_str(
            r#"{"type":"relayout","lane":"events","data":{"xaxis.range[0]":600,"xaxis.range[1]":900,"dragmode":"pan"}}"#,
        )
        .unwrap();
        assert_eq!(i, zoom(Lane::Events, 600.0, 900.0));

        let i: Interaction =
            serde_json::from_str(r#"{"type":"relayout","lane":"figures","data":{"xaxis.autorange":true}}"#)
                .unwrap();
        match i {
            Interaction::Relayout { data, .. } => assert_eq!(data.x_range(), None),
            other => panic!("unexpected interaction: {other:?}"),
        }

        let i: Interaction = serde_json::from_str(r#"{"type":"time_range","value":[-221,1911]}"#).unwrap();
        assert_eq!(
            i,
            Interaction::TimeRange {
                value: AxisRange(-221.0, 1911.0)
            }
        );

        let i: Interaction = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert_eq!(i, Interaction::Reset);
    }

    #[test]
    fn test_selection_serializes_tagged() {
        let mut c = TimelineController::new(dataset());
        c.dispatch(click(Lane::Figures, "figure_0"));
        let v = serde_json::to_value(&c.state().selection).unwrap();
        assert_eq!(v["state"], "showing_figure");
        assert_eq!(v["item"]["id"], "figure_0");
    }
}
