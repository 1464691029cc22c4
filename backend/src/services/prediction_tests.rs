#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::adapters::WeatherSource;
    use crate::geo::Geocoder;
    use crate::model::{ModelError, RiskModel};
    use crate::models::columns::*;
    use crate::models::{FieldValue, Frame, Record, WeatherRecord};
    use crate::preprocessing::{FeatureMatrix, PreprocessError, PreprocessorState};
    use crate::services::prediction::{HotspotInput, PredictionService};
    use crate::services::risk::RiskLevel;
    use crate::services::ServiceError;

    struct RecordingModel {
        names: Vec<String>,
        probability: f64,
        seen: Mutex<Vec<FeatureMatrix>>,
    }

    impl RiskModel for RecordingModel {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
            self.check_features(&features.columns)?;
            self.seen.lock().unwrap().push(features.clone());
            Ok(vec![self.probability; features.rows()])
        }
    }

    struct StaticWeather(Option<WeatherRecord>);

    #[async_trait]
    impl WeatherSource for StaticWeather {
        async fn daily(&self, _lat: f64, _lon: f64) -> Option<WeatherRecord> {
            self.0.clone()
        }
    }

    fn weather() -> WeatherRecord {
        WeatherRecord {
            tmax_c: 34.0,
            rhmax_pct: 70.0,
            precip_sum_mm: 0.0,
            precip_sum_7d: 0.0,
            precip_sum_30d: 12.0,
            wind_max_kmh: 15.0,
            solar_rad_j_m2: 20.0,
        }
    }

    fn fitted_preprocessor() -> PreprocessorState {
        let mut frame = Frame::with_rows(4);
        frame.set_numeric(TMAX_C, vec![30.0, 32.0, 35.0, 28.0]);
        frame.set_numeric(PRECIP_SUM_MM, vec![0.0, 2.0, 0.0, 8.0]);
        frame.set_text(
            PROVINCE,
            vec!["Sơn La".into(), "Lào Cai".into(), "Sơn La".into(), "Hà Nội".into()],
        );
        frame.set_numeric(LATITUDE, vec![21.3, 22.4, 21.1, 21.0]);
        frame.set_numeric(LONGITUDE, vec![103.9, 104.0, 104.1, 105.8]);
        frame.set_numeric(FRP, vec![10.0, 2.0, 30.0, 1.0]);
        frame.set_numeric(DAYNIGHT, vec![1.0, 0.0, 1.0, 0.0]);
        frame.set_numeric(PIXEL_AREA, vec![0.25, 0.16, 0.3, 0.2]);
        PreprocessorState::fit(&mut frame, &[1.0, 0.0, 1.0, 0.0]).unwrap()
    }

    fn service(probability: f64, weather: Option<WeatherRecord>) -> (PredictionService, Arc<RecordingModel>) {
        let preprocessor = Arc::new(fitted_preprocessor());
        let model = Arc::new(RecordingModel {
            names: preprocessor.expected_columns.clone(),
            probability,
            seen: Mutex::new(Vec::new()),
        });
        let svc = PredictionService::new(
            model.clone(),
            preprocessor,
            Arc::new(Geocoder::unavailable()),
            Arc::new(StaticWeather(weather)),
        )
        .unwrap();
        (svc, model)
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_new_rejects_feature_mismatch() {
        let model = Arc::new(RecordingModel {
            names: vec!["something_else".into()],
            probability: 0.1,
            seen: Mutex::new(Vec::new()),
        });
        let result = PredictionService::new(
            model,
            Arc::new(fitted_preprocessor()),
            Arc::new(Geocoder::unavailable()),
            Arc::new(StaticWeather(None)),
        );
        assert!(matches!(
            result,
            Err(ServiceError::Model(ModelError::FeatureMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_click_without_weather_is_error() {
        let (svc, model) = service(0.9, None);
        let err = svc.predict_location(21.0, 105.8, at(12)).await.unwrap_err();
        assert!(matches!(err, ServiceError::WeatherUnavailable { .. }));
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_uses_ambient_inputs() {
        let (svc, model) = service(0.87654, Some(weather()));

        let day = svc.predict_location(21.0, 105.8, at(12)).await.unwrap();
        assert_eq!(day.province, "Unknown");
        assert_eq!(day.assessment.probability, 0.8765);
        assert_eq!(day.assessment.risk_level, RiskLevel::High);
        assert!(day.assessment.is_fire);
        assert_eq!(day.weather, weather());
        assert!(day.hotspot_data.is_none());

        svc.predict_location(21.0, 105.8, at(22)).await.unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].get(0, DAYNIGHT), Some(1.0));
        assert_eq!(seen[1].get(0, DAYNIGHT), Some(0.0));
        // Unknown province encodes to the neutral value.
        assert_eq!(seen[0].get(0, PROVINCE), Some(0.0));
    }

    #[tokio::test]
    async fn test_hotspot_echoes_observation() {
        let (svc, model) = service(0.3, Some(weather()));
        let input = HotspotInput {
            lat: 21.0,
            lon: 105.8,
            frp: 42.5,
            bright_ti5: 301.2,
            acq_time: 2310,
            scan: None,
            track: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let result = svc.predict_hotspot(&input, today).await.unwrap();
        let hotspot = result.hotspot_data.unwrap();
        assert_eq!(hotspot.frp, 42.5);
        assert_eq!(hotspot.brightness, 301.2);
        assert_eq!(hotspot.time, 2310);
        assert_eq!(result.assessment.risk_level, RiskLevel::Low);
        assert_eq!(model.seen.lock().unwrap()[0].get(0, DAYNIGHT), Some(0.0));
    }

    #[test]
    fn test_score_record_tolerates_missing_columns() {
        let (svc, _) = service(0.6, None);
        let mut record = Record::new();
        record.insert(LATITUDE.into(), 21.0.into());
        record.insert(LONGITUDE.into(), 105.8.into());

        let assessment = svc
            .score_record(&record, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_score_record_rejects_unknown_daynight_label() {
        let (svc, _) = service(0.6, None);
        let mut record = Record::new();
        record.insert(LATITUDE.into(), 21.0.into());
        record.insert(LONGITUDE.into(), 105.8.into());
        record.insert(DAYNIGHT.into(), FieldValue::Text("dusk".into()));

        let err = svc
            .score_record(&record, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Preprocess(PreprocessError::NonNumericColumn(ref c)) if c == DAYNIGHT
        ));
    }
}
