use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::normalize::{NormalizeError, Table};

/// Paths of the three source tables found in a data directory.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub dynasties: PathBuf,
    pub events: PathBuf,
    pub figures: PathBuf,
}

impl SourceTables {
    pub fn path(&self, table: Table) -> &Path {
        match table {
            Table::Dynasties => &self.dynasties,
            Table::Events => &self.events,
            Table::Figures => &self.figures,
        }
    }
}

/// Scan the data directory and locate the source tables.
///
/// Expected layout:
///   {root}/dynasties.csv
///   {root}/events.csv
///   {root}/figures.csv
///
/// Only immediate children are considered; other files (the generated
/// `timeline_data.json`, notes, backups) are ignored. The stem match is
/// case-insensitive so `Events.CSV` is accepted too.
pub fn scan_data_dir(root: &Path) -> Result<SourceTables, NormalizeError> {
    let mut found: [Option<PathBuf>; 3] = [None, None, None];

    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(i) = Table::ALL
            .iter()
            .position(|t| t.as_str().eq_ignore_ascii_case(stem))
            && found[i].is_none()
        {
            found[i] = Some(path.to_path_buf());
        }
    }

    let [dynasties, events, figures] = found;
    let require = |slot: Option<PathBuf>, table: Table| {
        slot.ok_or_else(|| NormalizeError::MissingTable {
            table,
            dir: root.to_path_buf(),
        })
    };

    Ok(SourceTables {
        dynasties: require(dynasties, Table::Dynasties)?,
        events: require(events, Table::Events)?,
        figures: require(figures, Table::Figures)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_all_three_tables() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["dynasties.csv", "events.csv", "figures.csv", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::write(dir.path().join("timeline_data.json"), "{}").unwrap();

        let tables = scan_data_dir(dir.path()).unwrap();
        assert_eq!(tables.dynasties, dir.path().join("dynasties.csv"));
        assert_eq!(tables.path(Table::Events), dir.path().join("events.csv"));
        assert_eq!(tables.figures, dir.path().join("figures.csv"));
    }

    #[test]
    fn test_stem_match_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Dynasties.CSV", "events.csv", "FIGURES.csv"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let tables = scan_data_dir(dir.path()).unwrap();
        assert_eq!(tables.dynasties, dir.path().join("Dynasties.CSV"));
    }

    #[test]
    fn test_missing_table_is_named() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dynasties.csv"), "").unwrap();
        fs::write(dir.path().join("figures.csv"), "").unwrap();

        let err = scan_data_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MissingTable {
                table: Table::Events,
                ..
            }
        ));
    }

    #[test]
    fn test_nested_tables_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("old");
        fs::create_dir(&nested).unwrap();
        for name in ["dynasties.csv", "events.csv", "figures.csv"] {
            fs::write(nested.join(name), "").unwrap();
        }
        assert!(scan_data_dir(dir.path()).is_err());
    }
}
