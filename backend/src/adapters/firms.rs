//! FIRMS near-real-time hotspot feed.
//!
//! The area API serves CSV for a bounding box, a day range (1-10) and an end
//! date:
//!
//! ```text
//! {base}/api/area/csv/{MAP_KEY}/{SOURCE}/{west,south,east,north}/{DAYS}/{YYYY-MM-DD}
//! ```
//!
//! Sources are tried in priority order. A single-day request moves on to the
//! next source after a rate limit; a multi-day request backs off and retries
//! the same source once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use reqwest::{Client, StatusCode};

use super::AdapterError;
use crate::config::FirmsSettings;
use crate::features::{parse_date, DEFAULT_PIXEL_SIZE};
use crate::geo::{Geocoder, UNKNOWN_PROVINCE};
use crate::models::HotspotRecord;

/// Near-real-time products, newest satellite first.
pub const DEFAULT_SOURCES: [&str; 4] = [
    "VIIRS_NOAA21_NRT",
    "VIIRS_NOAA20_NRT",
    "VIIRS_SNPP_NRT",
    "MODIS_NRT",
];

/// `west,south,east,north` box around Vietnam.
pub const VIETNAM_AREA: &str = "102.14,8.61,109.47,23.39";

/// NRT products only keep about ten days of data.
pub const MAX_NRT_DAYS: u32 = 10;

pub const DEFAULT_FRP: f64 = 5.0;
pub const DEFAULT_BRIGHT_TI5: f64 = 310.0;
pub const DEFAULT_ACQ_TIME: u32 = 1200;

const REQUIRED_COLUMNS: [&str; 3] = ["latitude", "longitude", "acq_date"];

/// Result of one source request.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    Records(Vec<HotspotRecord>),
    RateLimited,
    Empty,
    Failed(String),
}

/// One FIRMS-style source of hotspot batches.
#[async_trait]
pub trait HotspotFeed: Send + Sync {
    /// Request `days` days of detections ending at `end` from `source`.
    async fn fetch(&self, source: &str, days: u32, end: NaiveDate) -> FeedOutcome;
}

/// HTTP client for the FIRMS area API.
#[derive(Debug, Clone)]
pub struct FirmsClient {
    client: Client,
    base_url: String,
    api_key: String,
    area: String,
}

impl FirmsClient {
    pub fn new(settings: &FirmsSettings) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        if settings.api_key.is_empty() {
            log::warn!("FIRMS_API_KEY is not set; hotspot requests will be rejected upstream");
        }
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            area: settings.area.clone(),
        })
    }

    pub fn request_url(&self, source: &str, days: u32, end: NaiveDate) -> String {
        format!(
            "{}/api/area/csv/{}/{}/{}/{}/{}",
            self.base_url,
            self.api_key,
            source,
            self.area,
            days,
            end.format("%Y-%m-%d")
        )
    }

    async fn download(&self, url: &str) -> Result<Result<String, StatusCode>, AdapterError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(Err(status));
        }
        Ok(Ok(response.text().await?))
    }
}

#[async_trait]
impl HotspotFeed for FirmsClient {
    async fn fetch(&self, source: &str, days: u32, end: NaiveDate) -> FeedOutcome {
        let url = self.request_url(source, days, end);
        match self.download(&url).await {
            Ok(Ok(body)) => match parse_firms_csv(&body) {
                Ok(records) if records.is_empty() => FeedOutcome::Empty,
                Ok(records) => FeedOutcome::Records(records),
                Err(e) => FeedOutcome::Failed(e.to_string()),
            },
            Ok(Err(StatusCode::TOO_MANY_REQUESTS)) => FeedOutcome::RateLimited,
            Ok(Err(status)) => FeedOutcome::Failed(format!("HTTP {}", status)),
            Err(e) => FeedOutcome::Failed(e.to_string()),
        }
    }
}

/// Parse a FIRMS CSV body into hotspot records.
///
/// Missing optional columns are defaulted. When a required column is absent
/// the whole batch is unusable and an empty list is returned. Rows whose
/// coordinates or date do not parse are dropped.
pub fn parse_firms_csv(body: &str) -> Result<Vec<HotspotRecord>, AdapterError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    let index: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !index.contains_key(c))
        .collect();
    if !missing.is_empty() {
        log::warn!("FIRMS batch missing required columns {:?}", missing);
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let row = row?;
        match parse_row(&row, &index) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::warn!("Dropped {} FIRMS rows with unparsable coordinates or date", dropped);
    }
    Ok(records)
}

fn field<'a>(row: &'a StringRecord, index: &HashMap<&str, usize>, name: &str) -> Option<&'a str> {
    index
        .get(name)
        .and_then(|i| row.get(*i))
        .filter(|s| !s.is_empty())
}

fn number(row: &StringRecord, index: &HashMap<&str, usize>, name: &str) -> Option<f64> {
    field(row, index, name).and_then(|s| s.parse().ok())
}

fn parse_row(row: &StringRecord, index: &HashMap<&str, usize>) -> Option<HotspotRecord> {
    let num = |name: &str| number(row, index, name);
    let text = |name: &str| field(row, index, name).map(str::to_string);

    let lat = num("latitude")?;
    let lon = num("longitude")?;
    let acq_date = field(row, index, "acq_date").and_then(parse_date)?;

    // VIIRS reports I4/I5 channels, MODIS reports channels 21/31.
    let bright_ti5 = num("bright_ti5")
        .or_else(|| num("bright_t31"))
        .unwrap_or(DEFAULT_BRIGHT_TI5);
    let bright = num("bright_ti4")
        .or_else(|| num("brightness"))
        .unwrap_or(bright_ti5);

    Some(HotspotRecord {
        lat,
        lon,
        bright,
        bright_ti5,
        frp: num("frp").unwrap_or(DEFAULT_FRP),
        scan: num("scan").unwrap_or(DEFAULT_PIXEL_SIZE),
        track: num("track").unwrap_or(DEFAULT_PIXEL_SIZE),
        acq_date,
        acq_time: num("acq_time").map(|t| t as u32).unwrap_or(DEFAULT_ACQ_TIME),
        daynight: text("daynight"),
        satellite: text("satellite"),
        confidence: text("confidence"),
        province: UNKNOWN_PROVINCE.to_string(),
    })
}

/// Attach provinces. With boundaries loaded, points outside Vietnam are
/// dropped; without them every record is tagged `"Unknown"`.
pub fn spatial_join(records: Vec<HotspotRecord>, geocoder: &Geocoder) -> Vec<HotspotRecord> {
    if !geocoder.is_available() {
        return records
            .into_iter()
            .map(|mut r| {
                r.province = UNKNOWN_PROVINCE.to_string();
                r
            })
            .collect();
    }

    let before = records.len();
    let joined: Vec<HotspotRecord> = records
        .into_iter()
        .filter_map(|mut r| {
            let province = geocoder.locate(r.lat, r.lon)?;
            r.province = province.to_string();
            Some(r)
        })
        .collect();
    log::info!("{} -> {} hotspots inside Vietnam", before, joined.len());
    joined
}

/// Source-priority orchestration over a [`HotspotFeed`].
#[derive(Clone)]
pub struct HotspotFetcher {
    feed: Arc<dyn HotspotFeed>,
    sources: Vec<String>,
    backoff: Duration,
}

impl HotspotFetcher {
    pub fn new(feed: Arc<dyn HotspotFeed>, sources: Vec<String>, backoff: Duration) -> Self {
        Self {
            feed,
            sources,
            backoff,
        }
    }

    /// Day range actually requested for a caller asking for `days`.
    pub fn effective_days(days: u32) -> u32 {
        days.clamp(1, MAX_NRT_DAYS)
    }

    /// Fetch detections for the last `days` days ending at `today`.
    ///
    /// Never fails: exhausting every source yields an empty list.
    pub async fn fetch(&self, days: u32, today: NaiveDate) -> Vec<HotspotRecord> {
        if days <= 1 {
            self.fetch_today(today).await
        } else {
            self.fetch_window(days, today).await
        }
    }

    async fn fetch_today(&self, today: NaiveDate) -> Vec<HotspotRecord> {
        for source in &self.sources {
            log::info!("Requesting {} (today)", source);
            match self.feed.fetch(source, 1, today).await {
                FeedOutcome::Records(records) => {
                    log::info!("{} hotspots from {}", records.len(), source);
                    return records;
                }
                FeedOutcome::RateLimited => {
                    log::warn!("{} rate limited, waiting {:?}", source, self.backoff);
                    tokio::time::sleep(self.backoff).await;
                }
                FeedOutcome::Empty => log::info!("No data from {}", source),
                FeedOutcome::Failed(reason) => log::warn!("{} failed: {}", source, reason),
            }
        }
        log::info!("No hotspots today");
        Vec::new()
    }

    async fn fetch_window(&self, days: u32, today: NaiveDate) -> Vec<HotspotRecord> {
        let actual = Self::effective_days(days);
        if days > actual {
            log::warn!(
                "NRT data limited to {} days; requesting {} instead of {}",
                MAX_NRT_DAYS,
                actual,
                days
            );
        }
        let start = today
            .checked_sub_days(Days::new(u64::from(actual - 1)))
            .unwrap_or(today);

        for source in &self.sources {
            log::info!("Requesting {} ({} days)", source, actual);
            let mut outcome = self.feed.fetch(source, actual, today).await;
            if outcome == FeedOutcome::RateLimited {
                log::warn!("{} rate limited, retrying once after {:?}", source, self.backoff);
                tokio::time::sleep(self.backoff).await;
                outcome = self.feed.fetch(source, actual, today).await;
            }

            match outcome {
                FeedOutcome::Records(records) => {
                    let in_window: Vec<HotspotRecord> = records
                        .into_iter()
                        .filter(|r| r.acq_date >= start && r.acq_date <= today)
                        .collect();
                    log::info!("{} hotspots from {}", in_window.len(), source);
                    return in_window;
                }
                FeedOutcome::RateLimited => log::warn!("{} still rate limited", source),
                FeedOutcome::Empty => log::info!("No data from {}", source),
                FeedOutcome::Failed(reason) => log::warn!("{} failed: {}", source, reason),
            }
        }
        log::info!("No hotspots in last {} days", actual);
        Vec::new()
    }
}

#[cfg(test)]
#[path = "firms_tests.rs"]
mod firms_tests;
