#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use chrono::NaiveDate;

use fire_risk::adapters::{FeedOutcome, HotspotFeed, WeatherSource};
use fire_risk::geo::ProvinceIndex;
use fire_risk::model::{GbdtRiskModel, TrainingParams};
use fire_risk::models::{HotspotRecord, WeatherRecord};
use fire_risk::preprocessing::PreprocessorState;
use fire_risk::training;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on drop (including on unwind) and serializes
/// access to process-global env vars across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Two adjacent unit squares: "Sơn La" over lon 103..104, "Hà Nội" over
/// lon 105..106, both between lat 20 and 22.
pub const PROVINCES_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "NAME_1": "Sơn La" },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[103.0, 20.0], [104.0, 20.0], [104.0, 22.0], [103.0, 22.0], [103.0, 20.0]]]
      }
    },
    {
      "type": "Feature",
      "properties": { "NAME_1": "Hà Nội" },
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [[[[105.0, 20.0], [106.0, 20.0], [106.0, 22.0], [105.0, 22.0], [105.0, 20.0]]]]
      }
    }
  ]
}"#;

pub fn province_index() -> ProvinceIndex {
    ProvinceIndex::from_geojson(PROVINCES_GEOJSON, "NAME_1").unwrap()
}

/// Synthetic labelled table in the historical training CSV layout.
pub fn training_csv(rows: usize) -> String {
    let mut out = String::from(
        "date,latitude_x,longitude_x,province,Tmax_C,RHmax_pct,Precip_sum_mm,Precip_sum_7d,\
         Precip_sum_30d,Wind_max_kmh,Solar_rad_J_m2,frp,bright_ti5,scan,track,daynight,is_fire\n",
    );
    for i in 0..rows {
        let fire = i % 3 != 1;
        let (tmax, rh, rain, frp) = if fire {
            (34.0 + (i % 4) as f64, 45.0, 0.0, 20.0 + i as f64)
        } else {
            (26.0 + (i % 3) as f64, 85.0, 6.0 + (i % 5) as f64, 1.0)
        };
        let province = ["Sơn La", "Hà Nội", "Lào Cai"][i % 3];
        out.push_str(&format!(
            "2023-{:02}-{:02},{:.2},{:.2},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            i % 12 + 1,
            i % 28 + 1,
            20.5 + (i % 6) as f64 * 0.25,
            103.2 + (i % 9) as f64 * 0.3,
            province,
            tmax,
            rh,
            rain,
            rain * 3.0,
            rain * 10.0 + 2.0,
            8.0 + (i % 4) as f64,
            18.0 + (i % 5) as f64,
            frp,
            300.0 + frp,
            0.4 + (i % 3) as f64 * 0.1,
            0.4,
            if i % 2 == 0 { "D" } else { "N" },
            u8::from(fire)
        ));
    }
    out
}

/// A small model fit once per test binary.
pub fn trained() -> (Arc<GbdtRiskModel>, Arc<PreprocessorState>) {
    static TRAINED: OnceLock<(Arc<GbdtRiskModel>, Arc<PreprocessorState>)> = OnceLock::new();
    let (model, preprocessor) = TRAINED.get_or_init(|| {
        let raw = training::read_csv(training_csv(60).as_bytes()).unwrap();
        let (frame, labels) = training::prepare(raw).unwrap();
        let params = TrainingParams {
            iterations: 30,
            max_depth: 3,
            ..TrainingParams::default()
        };
        let artifacts = training::fit(frame, labels, &params, 0).unwrap();
        (Arc::new(artifacts.model), Arc::new(artifacts.preprocessor))
    });
    (model.clone(), preprocessor.clone())
}

/// Weather from the documented end-to-end scenario.
pub fn scenario_weather() -> WeatherRecord {
    WeatherRecord {
        tmax_c: 35.0,
        rhmax_pct: 40.0,
        precip_sum_mm: 0.0,
        precip_sum_7d: 0.0,
        precip_sum_30d: 5.0,
        wind_max_kmh: 10.0,
        solar_rad_j_m2: 20.0,
    }
}

/// Weather source returning a fixed answer.
pub struct StaticWeather(pub Option<WeatherRecord>);

#[async_trait]
impl WeatherSource for StaticWeather {
    async fn daily(&self, _lat: f64, _lon: f64) -> Option<WeatherRecord> {
        self.0.clone()
    }
}

/// Hotspot feed that returns the same detections for every source.
pub struct FixedFeed(pub Vec<HotspotRecord>);

#[async_trait]
impl HotspotFeed for FixedFeed {
    async fn fetch(&self, _source: &str, _days: u32, _end: NaiveDate) -> FeedOutcome {
        if self.0.is_empty() {
            FeedOutcome::Empty
        } else {
            FeedOutcome::Records(self.0.clone())
        }
    }
}

pub fn hotspot(lat: f64, lon: f64, date: NaiveDate) -> HotspotRecord {
    HotspotRecord {
        lat,
        lon,
        bright: 335.0,
        bright_ti5: 298.0,
        frp: 14.2,
        scan: 0.39,
        track: 0.36,
        acq_date: date,
        acq_time: 645,
        daynight: Some("D".to_string()),
        satellite: Some("N".to_string()),
        confidence: Some("n".to_string()),
        province: String::new(),
    }
}
