use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A satellite fire detection after normalization.
///
/// Optional FIRMS columns have already been defaulted; `province` is set by
/// the spatial join (or `"Unknown"` when no polygons are available).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotRecord {
    pub lat: f64,
    pub lon: f64,
    /// Primary brightness temperature (K): VIIRS I4 or MODIS channel 21.
    pub bright: f64,
    /// VIIRS I5 brightness (K), or MODIS channel 31 as a stand-in.
    pub bright_ti5: f64,
    /// Fire radiative power (MW).
    pub frp: f64,
    pub scan: f64,
    pub track: f64,
    pub acq_date: NaiveDate,
    /// Acquisition time as HHMM (UTC).
    pub acq_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daynight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    pub province: String,
}

/// Day/night flag derived from an acquisition time in HHMM form.
/// Hours 06 through 18 inclusive count as day.
pub fn is_daytime(acq_time: u32) -> bool {
    let hour = acq_time / 100;
    (6..=18).contains(&hour)
}
