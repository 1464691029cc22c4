//! Column names shared by training data, serving records and the fitted pipeline.
//!
//! The weather column names keep the casing of the historical training CSV so
//! that a preprocessor bundle fit on that file lines up with serving requests.

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const PROVINCE: &str = "province";
pub const DAYNIGHT: &str = "daynight";
pub const IS_FIRE: &str = "is_fire";
pub const DATE: &str = "date";

pub const TMAX_C: &str = "Tmax_C";
pub const RHMAX_PCT: &str = "RHmax_pct";
pub const PRECIP_SUM_MM: &str = "Precip_sum_mm";
pub const PRECIP_SUM_7D: &str = "Precip_sum_7d";
pub const PRECIP_SUM_30D: &str = "Precip_sum_30d";
pub const WIND_MAX_KMH: &str = "Wind_max_kmh";
pub const SOLAR_RAD_J_M2: &str = "Solar_rad_J_m2";

pub const FRP: &str = "frp";
pub const BRIGHT_TI5: &str = "bright_ti5";
pub const SCAN: &str = "scan";
pub const TRACK: &str = "track";

pub const PIXEL_AREA: &str = "pixel_area";
pub const FRP_DENSITY: &str = "frp_density";
pub const RAIN_RATIO_7D_30D: &str = "rain_ratio_7d_30d";
pub const DAY_SIN: &str = "day_sin";
pub const DAY_COS: &str = "day_cos";

/// Columns passed through log1p before any scaling.
pub const LOG_COLUMNS: [&str; 3] = [PRECIP_SUM_MM, PRECIP_SUM_30D, FRP];

/// Candidate columns for the robust scaler. Only the ones present at fit time
/// are kept in the fitted state.
pub const ROBUST_COLUMNS: [&str; 11] = [
    TMAX_C,
    RHMAX_PCT,
    WIND_MAX_KMH,
    SOLAR_RAD_J_M2,
    BRIGHT_TI5,
    PRECIP_SUM_MM,
    PRECIP_SUM_30D,
    FRP,
    PIXEL_AREA,
    FRP_DENSITY,
    RAIN_RATIO_7D_30D,
];

/// Latitude and longitude, standardized jointly.
pub const GEO_COLUMNS: [&str; 2] = [LATITUDE, LONGITUDE];

/// Training column selection, in model order. `is_fire` is split off as the
/// label before preprocessing.
pub const TRAINING_COLUMNS: [&str; 18] = [
    TMAX_C,
    RHMAX_PCT,
    PRECIP_SUM_MM,
    WIND_MAX_KMH,
    SOLAR_RAD_J_M2,
    PROVINCE,
    LATITUDE,
    LONGITUDE,
    PRECIP_SUM_30D,
    BRIGHT_TI5,
    FRP,
    DAYNIGHT,
    IS_FIRE,
    DAY_SIN,
    DAY_COS,
    PIXEL_AREA,
    FRP_DENSITY,
    RAIN_RATIO_7D_30D,
];

/// Feature order assumed when a preprocessor bundle carries no
/// `expected_columns` entry.
pub fn default_expected_columns() -> Vec<String> {
    TRAINING_COLUMNS
        .iter()
        .filter(|c| **c != IS_FIRE)
        .map(|c| c.to_string())
        .collect()
}
