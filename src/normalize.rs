//! CSV source tables → consolidated [`TimelineData`].
//!
//! One pass per table: every year and importance cell is parsed up front
//! and the first bad cell aborts the whole run, so callers either get a
//! complete dataset or an error naming the offending table, row and field.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use timeline_types::{Dynasty, Event, Figure, RecordKind, TimeRange, TimelineData};
use tracing::{debug, info};

use crate::category::CategoryClassifier;
use crate::scanner::{self, SourceTables};

// ── Source tables ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Dynasties,
    Events,
    Figures,
}

impl Table {
    pub const ALL: [Table; 3] = [Self::Dynasties, Self::Events, Self::Figures];

    /// Table name, also the expected file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynasties => "dynasties",
            Self::Events => "events",
            Self::Figures => "figures",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no {table}.csv found in {}", dir.display())]
    MissingTable { table: Table, dir: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot scan data directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{table}: malformed CSV: {source}")]
    Csv { table: Table, source: csv::Error },

    #[error("{table} row {row}: {field} is not an integer year: {value:?}")]
    InvalidYear {
        table: Table,
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("{table} row {row}: importance must be an integer 1-5, got {value:?}")]
    InvalidImportance {
        table: Table,
        row: usize,
        value: String,
    },

    #[error("dynasties row {row}: {id} ends in {end_year} before it starts in {start_year}")]
    InvertedDynasty {
        row: usize,
        id: String,
        start_year: i32,
        end_year: i32,
    },

    #[error("no years in any table, time range is undefined")]
    EmptyTimeline,
}

// ── Raw rows ─────────────────────────────────────────────────────────

// Years and importance stay strings here so a bad cell is reported with
// its row and column instead of as a generic deserialization failure.

#[derive(Debug, Deserialize)]
struct DynastyRow {
    dynasty: String,
    start_year: String,
    end_year: String,
    #[serde(default)]
    description: String,
    color: String,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    year: String,
    event: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    dynasty: String,
    importance: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FigureRow {
    name: String,
    birth_year: String,
    death_year: String,
    #[serde(default)]
    dynasty: String,
    #[serde(default)]
    description: String,
    importance: String,
    #[serde(default)]
    image_url: Option<String>,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn parse_year(
    table: Table,
    row: usize,
    field: &'static str,
    raw: &str,
) -> Result<i32, NormalizeError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| NormalizeError::InvalidYear {
            table,
            row,
            field,
            value: raw.to_string(),
        })
}

fn parse_importance(table: Table, row: usize, raw: &str) -> Result<u8, NormalizeError> {
    match raw.trim().parse::<u8>() {
        Ok(v) if (1..=5).contains(&v) => Ok(v),
        _ => Err(NormalizeError::InvalidImportance {
            table,
            row,
            value: raw.to_string(),
        }),
    }
}

/// Blank cells become `None`, never `Some("")`.
fn non_blank(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ── Per-table passes ─────────────────────────────────────────────────

pub fn read_dynasties<R: Read>(reader: R) -> Result<Vec<Dynasty>, NormalizeError> {
    let table = Table::Dynasties;
    let mut rdr = csv_reader(reader);
    let mut out = Vec::new();

    for (row, record) in rdr.deserialize::<DynastyRow>().enumerate() {
        let r = record.map_err(|source| NormalizeError::Csv { table, source })?;
        let start_year = parse_year(table, row, "start_year", &r.start_year)?;
        let end_year = parse_year(table, row, "end_year", &r.end_year)?;
        if end_year < start_year {
            return Err(NormalizeError::InvertedDynasty {
                row,
                id: r.dynasty,
                start_year,
                end_year,
            });
        }

        out.push(Dynasty {
            id: r.dynasty,
            start_year,
            end_year,
            duration: end_year - start_year,
            description: r.description,
            color: r.color,
            kind: RecordKind::Dynasty,
        });
    }

    Ok(out)
}

/// Read the events table. Rows without a category (no column at all, or a
/// blank cell) are classified from their title and description.
pub fn read_events<R: Read>(
    reader: R,
    classifier: &CategoryClassifier,
) -> Result<Vec<Event>, NormalizeError> {
    let table = Table::Events;
    let mut rdr = csv_reader(reader);

    let has_category = rdr
        .headers()
        .map_err(|source| NormalizeError::Csv { table, source })?
        .iter()
        .any(|h| h == "category");
    if !has_category {
        info!("events table has no category column, inferring from keywords");
    }

    let mut out = Vec::new();
    for (row, record) in rdr.deserialize::<EventRow>().enumerate() {
        let r = record.map_err(|source| NormalizeError::Csv { table, source })?;
        let year = parse_year(table, row, "year", &r.year)?;
        let importance = parse_importance(table, row, &r.importance)?;

        let category = match non_blank(r.category) {
            Some(label) => label,
            None => {
                let inferred = classifier.infer(&r.event, &r.description);
                debug!(row, title = %r.event, category = inferred.as_chinese(), "inferred category");
                inferred.as_chinese().to_string()
            }
        };

        out.push(Event {
            id: format!("event_{row}"),
            year,
            title: r.event,
            description: r.description,
            dynasty: r.dynasty,
            importance,
            category,
            image_url: non_blank(r.image_url),
            kind: RecordKind::Event,
        });
    }

    Ok(out)
}

pub fn read_figures<R: Read>(reader: R) -> Result<Vec<Figure>, NormalizeError> {
    let table = Table::Figures;
    let mut rdr = csv_reader(reader);
    let mut out = Vec::new();

    for (row, record) in rdr.deserialize::<FigureRow>().enumerate() {
        let r = record.map_err(|source| NormalizeError::Csv { table, source })?;
        out.push(Figure {
            id: format!("figure_{row}"),
            name: r.name,
            birth_year: parse_year(table, row, "birth_year", &r.birth_year)?,
            death_year: parse_year(table, row, "death_year", &r.death_year)?,
            dynasty: r.dynasty,
            description: r.description,
            importance: parse_importance(table, row, &r.importance)?,
            image_url: non_blank(r.image_url),
            kind: RecordKind::Figure,
        });
    }

    Ok(out)
}

// ── Consolidation ────────────────────────────────────────────────────

/// Assemble the dataset and compute its [`TimeRange`] over every dynasty
/// boundary, event year and figure birth/death year.
pub fn build_timeline(
    dynasties: Vec<Dynasty>,
    events: Vec<Event>,
    figures: Vec<Figure>,
) -> Result<TimelineData, NormalizeError> {
    let years = dynasties
        .iter()
        .flat_map(|d| [d.start_year, d.end_year])
        .chain(events.iter().map(|e| e.year))
        .chain(figures.iter().flat_map(|f| [f.birth_year, f.death_year]));
    let time_range = TimeRange::covering(years).ok_or(NormalizeError::EmptyTimeline)?;

    Ok(TimelineData {
        dynasties,
        events,
        figures,
        time_range,
    })
}

/// Normalize three CSV sources into one dataset.
pub fn normalize<D: Read, E: Read, F: Read>(
    dynasties: D,
    events: E,
    figures: F,
) -> Result<TimelineData, NormalizeError> {
    let classifier = CategoryClassifier::new();
    build_timeline(
        read_dynasties(dynasties)?,
        read_events(events, &classifier)?,
        read_figures(figures)?,
    )
}

fn open(path: &Path) -> Result<File, NormalizeError> {
    File::open(path).map_err(|source| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn normalize_tables(tables: &SourceTables) -> Result<TimelineData, NormalizeError> {
    normalize(
        open(tables.path(Table::Dynasties))?,
        open(tables.path(Table::Events))?,
        open(tables.path(Table::Figures))?,
    )
}

/// Locate the source tables under `root` and normalize them.
pub fn normalize_dir(root: &Path) -> Result<TimelineData, NormalizeError> {
    let tables = scanner::scan_data_dir(root)?;
    info!(
        dynasties = %tables.dynasties.display(),
        events = %tables.events.display(),
        figures = %tables.figures.display(),
        "found source tables"
    );
    normalize_tables(&tables)
}
