pub mod columns;
pub mod frame;
pub mod hotspot;
pub mod weather;

pub use frame::{Column, FieldValue, Frame, Record};
pub use hotspot::{is_daytime, HotspotRecord};
pub use weather::WeatherRecord;
