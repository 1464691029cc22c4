//! Feature engineering shared by training and serving.
//!
//! Every derivation here is pure and deterministic. A derivation whose source
//! columns are missing is skipped rather than treated as an error, so partial
//! schemas flow through and get zero-filled by the final reindex.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

use crate::models::columns::{
    DAYNIGHT, DAY_COS, DAY_SIN, FRP, FRP_DENSITY, PIXEL_AREA, PRECIP_SUM_30D, PRECIP_SUM_7D,
    RAIN_RATIO_7D_30D, SCAN, TRACK,
};
use crate::models::{Column, Frame};

/// Guards ratio features against a zero denominator.
pub const EPSILON: f64 = 1e-5;

/// Pixel size assumed when a serving request omits `scan`/`track`.
pub const DEFAULT_PIXEL_SIZE: f64 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("invalid date `{value}` in column `{column}`")]
    InvalidDate { column: String, value: String },
}

/// Add `pixel_area`, `frp_density` and `rain_ratio_7d_30d` where their inputs exist.
pub fn engineer(frame: &mut Frame) {
    if let (Some(scan), Some(track)) = (frame.numeric(SCAN), frame.numeric(TRACK)) {
        let area = scan.iter().zip(track).map(|(s, t)| s * t).collect();
        frame.set_numeric(PIXEL_AREA, area);
    }

    if let (Some(frp), Some(area)) = (frame.numeric(FRP), frame.numeric(PIXEL_AREA)) {
        let density = frp
            .iter()
            .zip(area)
            .map(|(f, a)| f / (a + EPSILON))
            .collect();
        frame.set_numeric(FRP_DENSITY, density);
    }

    if let (Some(p7), Some(p30)) = (frame.numeric(PRECIP_SUM_7D), frame.numeric(PRECIP_SUM_30D)) {
        let ratio = p7
            .iter()
            .zip(p30)
            .map(|(a, b)| a / (b + EPSILON))
            .collect();
        frame.set_numeric(RAIN_RATIO_7D_30D, ratio);
    }
}

/// Sine/cosine encoding of a day of year on a 365-day cycle.
pub fn cyclic_day(day_of_year: u32) -> (f64, f64) {
    let angle = 2.0 * PI * day_of_year as f64 / 365.0;
    (angle.sin(), angle.cos())
}

/// Set `day_sin`/`day_cos` for every row from one calendar date.
///
/// Serving uses the current date here, not the observation date.
pub fn add_cyclic_day_for(frame: &mut Frame, date: NaiveDate) {
    let (sin, cos) = cyclic_day(date.ordinal());
    let rows = frame.len();
    frame.set_numeric(DAY_SIN, vec![sin; rows]);
    frame.set_numeric(DAY_COS, vec![cos; rows]);
}

/// Set `day_sin`/`day_cos` per row from a text date column.
///
/// Accepts `YYYY-MM-DD` optionally followed by a time part. Skipped when the
/// column is absent.
pub fn add_cyclic_day_from_column(frame: &mut Frame, column: &str) -> Result<(), FeatureError> {
    let Some(dates) = frame.text(column) else {
        return Ok(());
    };

    let mut sin = Vec::with_capacity(dates.len());
    let mut cos = Vec::with_capacity(dates.len());
    for raw in dates {
        let date = parse_date(raw).ok_or_else(|| FeatureError::InvalidDate {
            column: column.to_string(),
            value: raw.clone(),
        })?;
        let (s, c) = cyclic_day(date.ordinal());
        sin.push(s);
        cos.push(c);
    }

    frame.set_numeric(DAY_SIN, sin);
    frame.set_numeric(DAY_COS, cos);
    Ok(())
}

/// Parse the date part of `YYYY-MM-DD[ T]...`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Map a textual `daynight` column (`D`/`N`) to 1/0.
///
/// A numeric column is left untouched. A text column holding any other label
/// is also left as text, so the final reindex reports it instead of the model
/// silently receiving a guess.
pub fn encode_daynight(frame: &mut Frame) {
    let Some(Column::Text(labels)) = frame.column(DAYNIGHT) else {
        return;
    };

    let mapped: Option<Vec<f64>> = labels.iter().map(|l| daynight_value(l)).collect();
    if let Some(values) = mapped {
        frame.set_numeric(DAYNIGHT, values);
    }
}

fn daynight_value(label: &str) -> Option<f64> {
    match label.trim() {
        "D" => Some(1.0),
        "N" => Some(0.0),
        _ => None,
    }
}

/// Serving-side feature preparation for a one-row frame built from a request.
pub fn prepare_serving_frame(frame: &mut Frame, today: NaiveDate) {
    frame.fill_missing(SCAN, DEFAULT_PIXEL_SIZE);
    frame.fill_missing(TRACK, DEFAULT_PIXEL_SIZE);
    engineer(frame);
    add_cyclic_day_for(frame, today);
    encode_daynight(frame);
}
