//! Recent hotspot listing for the map.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::ServiceError;
use crate::adapters::{spatial_join, HotspotFetcher};
use crate::geo::Geocoder;
use crate::models::HotspotRecord;

/// Largest `days` value a caller may ask for. Anything above the NRT window
/// is capped by the fetcher.
pub const MAX_REQUEST_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotListing {
    pub data: Vec<HotspotRecord>,
    pub count: usize,
    /// Window actually covered after capping.
    pub days: u32,
}

#[derive(Clone)]
pub struct HotspotService {
    fetcher: HotspotFetcher,
    geocoder: Arc<Geocoder>,
}

impl HotspotService {
    pub fn new(fetcher: HotspotFetcher, geocoder: Arc<Geocoder>) -> Self {
        Self { fetcher, geocoder }
    }

    /// Hotspots inside Vietnam for the last `days` days ending at `today`.
    ///
    /// Upstream failures yield an empty listing; only an out-of-range `days`
    /// is an error.
    pub async fn list(&self, days: u32, today: NaiveDate) -> Result<HotspotListing, ServiceError> {
        if !(1..=MAX_REQUEST_DAYS).contains(&days) {
            return Err(ServiceError::InvalidInput(format!(
                "days must be between 1 and {}, got {}",
                MAX_REQUEST_DAYS, days
            )));
        }

        let records = self.fetcher.fetch(days, today).await;
        let data = spatial_join(records, &self.geocoder);
        Ok(HotspotListing {
            count: data.len(),
            days: HotspotFetcher::effective_days(days),
            data,
        })
    }
}
