use serde::{Deserialize, Serialize};

use super::columns;
use super::frame::Record;

/// Daily weather aggregates for one location.
///
/// Field names serialize with the same casing as the training columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "Tmax_C")]
    pub tmax_c: f64,
    #[serde(rename = "RHmax_pct")]
    pub rhmax_pct: f64,
    #[serde(rename = "Precip_sum_mm")]
    pub precip_sum_mm: f64,
    #[serde(rename = "Precip_sum_7d")]
    pub precip_sum_7d: f64,
    #[serde(rename = "Precip_sum_30d")]
    pub precip_sum_30d: f64,
    #[serde(rename = "Wind_max_kmh")]
    pub wind_max_kmh: f64,
    #[serde(rename = "Solar_rad_J_m2")]
    pub solar_rad_j_m2: f64,
}

impl WeatherRecord {
    /// Copy every weather field into `record`, overwriting existing keys.
    pub fn write_into(&self, record: &mut Record) {
        let fields = [
            (columns::TMAX_C, self.tmax_c),
            (columns::RHMAX_PCT, self.rhmax_pct),
            (columns::PRECIP_SUM_MM, self.precip_sum_mm),
            (columns::PRECIP_SUM_7D, self.precip_sum_7d),
            (columns::PRECIP_SUM_30D, self.precip_sum_30d),
            (columns::WIND_MAX_KMH, self.wind_max_kmh),
            (columns::SOLAR_RAD_J_M2, self.solar_rad_j_m2),
        ];
        for (name, value) in fields {
            record.insert(name.to_string(), value.into());
        }
    }
}
