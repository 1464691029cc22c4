//! Historical fire counts per province and per calendar month.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::features::parse_date;
use crate::models::columns::{DATE, IS_FIRE, PROVINCE};

const ACQ_DATE: &str = "acq_date";

/// Aggregates served by `/api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FireStats {
    pub total_fires: usize,
    /// Fire count per province name.
    pub heatmap: BTreeMap<String, usize>,
    /// Fire count per month number (1-12).
    pub monthly: BTreeMap<u32, usize>,
}

/// Aggregate a historical CSV.
///
/// Rows count as fires when `is_fire` parses to a value above 0.5; without an
/// `is_fire` column every row counts. Rows with a blank province or an
/// unparsable date still count toward the total.
pub fn aggregate<R: Read>(reader: R) -> Result<FireStats, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let province_idx = position(PROVINCE);
    let date_idx = position(DATE).or_else(|| position(ACQ_DATE));
    let label_idx = position(IS_FIRE);

    let mut stats = FireStats::default();
    for row in reader.records() {
        let row = row?;
        if let Some(i) = label_idx {
            let is_fire = row
                .get(i)
                .and_then(|v| v.parse::<f64>().ok())
                .is_some_and(|v| v > 0.5);
            if !is_fire {
                continue;
            }
        }

        stats.total_fires += 1;
        if let Some(province) = province_idx.and_then(|i| row.get(i)).filter(|p| !p.is_empty()) {
            *stats.heatmap.entry(province.to_string()).or_insert(0) += 1;
        }
        if let Some(date) = date_idx.and_then(|i| row.get(i)).and_then(parse_date) {
            *stats.monthly.entry(date.month()).or_insert(0) += 1;
        }
    }
    Ok(stats)
}

/// Aggregate a CSV file; a missing file yields empty aggregates.
pub fn load_stats(path: &Path) -> Result<FireStats, ServiceError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("Historical data {} not found, returning empty stats", path.display());
            return Ok(FireStats::default());
        }
        Err(source) => {
            return Err(ServiceError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    Ok(aggregate(file)?)
}

/// Serves historical aggregates from a CSV on disk.
#[derive(Debug, Clone)]
pub struct StatsService {
    path: PathBuf,
}

impl StatsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Aggregate on the blocking pool.
    pub async fn summary(&self) -> Result<FireStats, ServiceError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_stats(&path))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = "\
province,date,is_fire,frp
Sơn La,2023-03-01,1,10.0
Sơn La,2023-03-15,1,4.0
Điện Biên,2023-04-02,1,8.0
Điện Biên,2023-04-03,0,0.0
Lào Cai,2022-12-30 00:00:00,1,2.5
";

    #[test]
    fn test_aggregate_counts_fire_rows() {
        let stats = aggregate(HISTORY.as_bytes()).unwrap();
        assert_eq!(stats.total_fires, 4);
        assert_eq!(stats.heatmap["Sơn La"], 2);
        assert_eq!(stats.heatmap["Điện Biên"], 1);
        assert_eq!(stats.heatmap["Lào Cai"], 1);
        assert_eq!(stats.monthly[&3], 2);
        assert_eq!(stats.monthly[&4], 1);
        assert_eq!(stats.monthly[&12], 1);
    }

    #[test]
    fn test_aggregate_without_label_counts_all_rows() {
        let csv = "province,acq_date\nA,2024-01-05\nB,2024-01-06\nA,2024-02-01\n";
        let stats = aggregate(csv.as_bytes()).unwrap();
        assert_eq!(stats.total_fires, 3);
        assert_eq!(stats.heatmap["A"], 2);
        assert_eq!(stats.monthly[&1], 2);
        assert_eq!(stats.monthly[&2], 1);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let stats = load_stats(Path::new("/nonexistent/history.csv")).unwrap();
        assert_eq!(stats, FireStats::default());
    }

    #[test]
    fn test_monthly_keys_serialize_as_strings() {
        let stats = aggregate(HISTORY.as_bytes()).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["monthly"]["3"], 2);
        assert_eq!(json["total_fires"], 4);
    }

    #[tokio::test]
    async fn test_service_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(&path, HISTORY).unwrap();

        let stats = StatsService::new(&path).summary().await.unwrap();
        assert_eq!(stats.total_fires, 4);
    }
}
