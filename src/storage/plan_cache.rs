//! Plan datasets
//!
//! Production plan and standard time exports are CSV files dropped into the
//! plan data directory by an upstream system. Each file must carry exactly
//! the dataset's column header. Parsed contents are cached per dataset and
//! re-read only when the file's modification time changes.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::to_utc_iso;

/// A CSV export the plan cache knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanDataset {
    pub key: &'static str,
    pub file_name: &'static str,
    pub columns: &'static [&'static str],
    pub label: &'static str,
}

pub const PRODUCTION_PLAN: PlanDataset = PlanDataset {
    key: "production_plan",
    file_name: "production_plan.csv",
    columns: &["納期", "個数", "部品番号", "部品名", "製番", "工程名"],
    label: "生産計画",
};

pub const STANDARD_TIMES: PlanDataset = PlanDataset {
    key: "standard_times",
    file_name: "standard_times.csv",
    columns: &["部品名", "機械標準工数", "製造オーダー番号", "部品番号", "工程名"],
    label: "標準工数",
};

pub const PLAN_DATASETS: [PlanDataset; 2] = [PRODUCTION_PLAN, STANDARD_TIMES];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("unexpected columns: {0:?}")]
    UnexpectedColumns(Vec<String>),
    #[error("failed to load dataset: {0}")]
    Load(String),
}

/// Body served for a dataset. `error` is set when the file is missing or
/// unusable; `entries` is then empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSnapshot {
    pub label: String,
    pub entries: Vec<BTreeMap<String, String>>,
    pub updated_at: Option<String>,
    pub error: Option<String>,
}

impl PlanSnapshot {
    fn empty(dataset: &PlanDataset) -> Self {
        Self {
            label: dataset.label.to_string(),
            entries: Vec::new(),
            updated_at: None,
            error: None,
        }
    }

    fn failed(dataset: &PlanDataset, error: &PlanError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::empty(dataset)
        }
    }

    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-dataset refresh result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRefresh {
    pub key: &'static str,
    pub entries: usize,
    pub error: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedPlan {
    modified: Option<SystemTime>,
    snapshot: PlanSnapshot,
}

#[derive(Debug)]
pub struct PlanCache {
    data_dir: PathBuf,
    cached: Mutex<HashMap<&'static str, CachedPlan>>,
}

impl PlanCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cached: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Current contents of `dataset`, re-read if the file changed on disk.
    pub fn get(&self, dataset: &PlanDataset) -> PlanSnapshot {
        self.load(dataset, false)
    }

    /// Re-read every dataset regardless of modification time.
    pub fn refresh_all(&self) -> Vec<PlanRefresh> {
        PLAN_DATASETS
            .iter()
            .map(|dataset| {
                let snapshot = self.load(dataset, true);
                PlanRefresh {
                    key: dataset.key,
                    entries: snapshot.entries.len(),
                    error: snapshot.error,
                    updated_at: snapshot.updated_at,
                }
            })
            .collect()
    }

    fn load(&self, dataset: &PlanDataset, force: bool) -> PlanSnapshot {
        let path = self.data_dir.join(dataset.file_name);
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);

        let Ok(metadata) = std::fs::metadata(&path) else {
            let snapshot = PlanSnapshot::failed(dataset, &PlanError::NotFound(dataset.label));
            cached.insert(
                dataset.key,
                CachedPlan {
                    modified: None,
                    snapshot: snapshot.clone(),
                },
            );
            return snapshot;
        };
        let modified = metadata.modified().ok();

        if !force {
            if let Some(entry) = cached.get(dataset.key) {
                if entry.modified.is_some() && entry.modified == modified {
                    return entry.snapshot.clone();
                }
            }
        }

        let snapshot = match read_dataset(&path, dataset) {
            Ok(entries) => {
                debug!(dataset = dataset.key, entries = entries.len(), "Plan dataset loaded");
                PlanSnapshot {
                    entries,
                    updated_at: modified.map(|m| to_utc_iso(&DateTime::<Utc>::from(m))),
                    ..PlanSnapshot::empty(dataset)
                }
            }
            Err(e) => {
                warn!(dataset = dataset.key, path = %path.display(), error = %e, "Plan dataset unusable");
                PlanSnapshot::failed(dataset, &e)
            }
        };

        cached.insert(
            dataset.key,
            CachedPlan {
                modified,
                snapshot: snapshot.clone(),
            },
        );
        snapshot
    }
}

/// Read a CSV export whose header must equal `dataset.columns` exactly.
/// A leading UTF-8 BOM is ignored; short rows fill missing cells with "".
fn read_dataset(path: &Path, dataset: &PlanDataset) -> Result<Vec<BTreeMap<String, String>>, PlanError> {
    let bytes = std::fs::read(path).map_err(|e| PlanError::Load(e.to_string()))?;
    let content = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PlanError::Load(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers != dataset.columns {
        return Err(PlanError::UnexpectedColumns(headers));
    }

    reader
        .records()
        .map(|row| {
            let row = row.map_err(|e| PlanError::Load(e.to_string()))?;
            Ok(dataset
                .columns
                .iter()
                .enumerate()
                .map(|(i, column)| ((*column).to_string(), row.get(i).unwrap_or_default().to_string()))
                .collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;

    const PLAN_HEADER: &str = "納期,個数,部品番号,部品名,製番,工程名";

    fn write_plan(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(PRODUCTION_PLAN.file_name);
        fs::write(&path, body).unwrap();
        path
    }

    fn set_mtime(path: &Path, secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_missing_file_reports_label() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = PlanCache::new(dir.path()).get(&STANDARD_TIMES);
        assert_eq!(snapshot.label, "標準工数");
        assert_eq!(snapshot.error.as_deref(), Some("標準工数 not found"));
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.updated_at.is_none());
    }

    #[test]
    fn test_reads_rows_with_bom_and_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_plan(
            dir.path(),
            &format!("\u{feff}{PLAN_HEADER}\n2025-01-10,5,P-1,Bracket,S-9,加工\n2025-01-11,2,P-2\n"),
        );
        set_mtime(&path, 1_735_718_400);

        let snapshot = PlanCache::new(dir.path()).get(&PRODUCTION_PLAN);
        assert!(snapshot.is_ok(), "{:?}", snapshot.error);
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0]["部品番号"], "P-1");
        assert_eq!(snapshot.entries[0]["工程名"], "加工");
        assert_eq!(snapshot.entries[1]["部品名"], "");
        assert_eq!(snapshot.updated_at.as_deref(), Some("2025-01-01T08:00:00Z"));
    }

    #[test]
    fn test_wrong_header_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_plan(dir.path(), "part,qty\nP-1,5\n");
        let snapshot = PlanCache::new(dir.path()).get(&PRODUCTION_PLAN);
        assert_eq!(
            snapshot.error.as_deref(),
            Some(r#"unexpected columns: ["part", "qty"]"#)
        );
        assert!(snapshot.entries.is_empty());
    }

    #[test]
    fn test_cache_rereads_only_when_mtime_changes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PlanCache::new(dir.path());
        let path = write_plan(dir.path(), &format!("{PLAN_HEADER}\n2025-01-10,5,P-1,a,b,c\n"));
        set_mtime(&path, 1_000);
        assert_eq!(cache.get(&PRODUCTION_PLAN).entries.len(), 1);

        fs::write(&path, format!("{PLAN_HEADER}\n2025-01-10,5,P-1,a,b,c\n2025-01-11,1,P-2,a,b,c\n")).unwrap();
        set_mtime(&path, 1_000);
        assert_eq!(cache.get(&PRODUCTION_PLAN).entries.len(), 1);

        set_mtime(&path, 2_000);
        assert_eq!(cache.get(&PRODUCTION_PLAN).entries.len(), 2);
    }

    #[test]
    fn test_refresh_all_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PlanCache::new(dir.path());
        let path = write_plan(dir.path(), &format!("{PLAN_HEADER}\n"));
        set_mtime(&path, 1_000);
        assert!(cache.get(&PRODUCTION_PLAN).entries.is_empty());

        fs::write(&path, format!("{PLAN_HEADER}\n2025-01-10,5,P-1,a,b,c\n")).unwrap();
        set_mtime(&path, 1_000);

        let summary = cache.refresh_all();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].key, "production_plan");
        assert_eq!(summary[0].entries, 1);
        assert_eq!(summary[1].error.as_deref(), Some("標準工数 not found"));
    }
}
