//! Labelled training table: CSV loading and feature preparation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use super::DatasetError;
use crate::features::{add_cyclic_day_from_column, encode_daynight, engineer};
use crate::models::columns::{DATE, DAYNIGHT, IS_FIRE, LATITUDE, LONGITUDE, TRAINING_COLUMNS};
use crate::models::{Column, Frame};

/// Read a CSV file into a [`Frame`].
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Frame, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(file)
}

/// Parse CSV with a header row.
///
/// A column is numeric when every non-empty cell parses as a number; empty
/// cells in numeric columns become NaN. Anything else is kept as text.
pub fn read_csv<R: Read>(reader: R) -> Result<Frame, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let rows = cells.first().map(Vec::len).unwrap_or(0);
    let mut frame = Frame::with_rows(rows);
    for (name, values) in headers.iter().zip(cells) {
        if frame.has(name) {
            log::warn!("Duplicate CSV column `{}` ignored", name);
            continue;
        }
        match parse_numeric(&values) {
            Some(numbers) => frame.set_numeric(name, numbers),
            None => frame.set_text(name, values),
        }
    }
    Ok(frame)
}

fn parse_numeric(values: &[String]) -> Option<Vec<f64>> {
    values
        .iter()
        .map(|v| {
            if v.is_empty() {
                Some(f64::NAN)
            } else {
                v.parse::<f64>().ok()
            }
        })
        .collect()
}

/// Turn a raw training table into model columns plus `is_fire` labels.
///
/// Steps: rename `latitude_x`/`longitude_x`, derive `day_sin`/`day_cos` from
/// `date`, map `daynight`, engineer features, keep the training columns that
/// exist, then replace missing numeric values with 0.
pub fn prepare(mut frame: Frame) -> Result<(Frame, Vec<f64>), DatasetError> {
    frame.rename("latitude_x", LATITUDE);
    frame.rename("longitude_x", LONGITUDE);

    add_cyclic_day_from_column(&mut frame, DATE)?;

    encode_daynight(&mut frame);
    if let Some(labels) = frame.text(DAYNIGHT) {
        // Unknown labels become missing, and missing becomes 0 below.
        let mapped = labels
            .iter()
            .map(|l| match l.as_str() {
                "D" => 1.0,
                "N" => 0.0,
                _ => f64::NAN,
            })
            .collect();
        log::warn!("Unrecognised daynight labels in training data treated as missing");
        frame.set_numeric(DAYNIGHT, mapped);
    }

    engineer(&mut frame);

    let mut selected = frame.select(&TRAINING_COLUMNS);
    selected.fill_non_finite(0.0);

    let labels = match selected.remove(IS_FIRE) {
        Some(Column::Numeric(values)) => values,
        Some(Column::Text(_)) => return Err(DatasetError::NonNumericLabel),
        None => return Err(DatasetError::MissingLabel),
    };
    Ok((selected, labels))
}

/// Deterministic hold-out split: every `every`-th row goes to the test side.
/// `every < 2` keeps everything for training.
pub fn holdout_split(rows: usize, every: usize) -> (Vec<usize>, Vec<usize>) {
    if every < 2 {
        return ((0..rows).collect(), Vec::new());
    }
    (0..rows).partition(|i| (i + 1) % every != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns::*;

    const SAMPLE: &str = "\
date,latitude_x,longitude_x,province,Tmax_C,Precip_sum_mm,Precip_sum_7d,Precip_sum_30d,frp,scan,track,daynight,is_fire,GID_1
2023-03-01,21.3,103.9,Sơn La,33.1,0.0,0.0,5.0,50.0,0.5,0.5,D,1,VNM.1
2023-03-02,22.4,104.0,Lào Cai,29.0,,1.0,12.0,3.0,0.4,0.4,N,0,VNM.2
2023-07-15,21.0,105.8,Hà Nội,35.0,4.2,8.0,40.0,8.0,0.6,0.5,D,0,VNM.3
";

    #[test]
    fn test_read_csv_infers_types() {
        let frame = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(frame.len(), 3);
        assert!(frame.numeric("Tmax_C").is_some());
        assert!(frame.text("province").is_some());
        assert!(frame.text("date").is_some());
        assert!(frame.numeric(PRECIP_SUM_MM).unwrap()[1].is_nan());
    }

    #[test]
    fn test_prepare_builds_training_columns() {
        let (frame, labels) = prepare(read_csv(SAMPLE.as_bytes()).unwrap()).unwrap();

        assert_eq!(labels, vec![1.0, 0.0, 0.0]);
        assert!(!frame.has(IS_FIRE));
        assert!(!frame.has("GID_1"));
        assert!(!frame.has(DATE));
        assert_eq!(frame.numeric(LATITUDE).unwrap()[0], 21.3);
        assert_eq!(frame.numeric(DAYNIGHT), Some(&[1.0, 0.0, 1.0][..]));
        assert_eq!(frame.numeric(PRECIP_SUM_MM).unwrap()[1], 0.0);
        assert_eq!(frame.numeric(PIXEL_AREA).unwrap()[0], 0.25);
        assert!(frame.has(DAY_SIN) && frame.has(DAY_COS));
        // Precip_sum_7d only feeds the ratio and is not a model column.
        assert!(!frame.has(PRECIP_SUM_7D));
        assert!(frame.has(RAIN_RATIO_7D_30D));

        let order: Vec<&str> = frame.column_names().iter().map(String::as_str).collect();
        let expected: Vec<&str> = TRAINING_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != IS_FIRE && !matches!(*c, "RHmax_pct" | "Wind_max_kmh" | "Solar_rad_J_m2" | "bright_ti5"))
            .collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_prepare_unknown_daynight_becomes_zero() {
        let csv = "latitude,longitude,daynight,is_fire\n21.0,105.0,X,1\n21.0,105.0,D,0\n";
        let (frame, _) = prepare(read_csv(csv.as_bytes()).unwrap()).unwrap();
        assert_eq!(frame.numeric(DAYNIGHT), Some(&[0.0, 1.0][..]));
    }

    #[test]
    fn test_prepare_requires_label() {
        let csv = "latitude,longitude\n21.0,105.0\n";
        assert!(matches!(
            prepare(read_csv(csv.as_bytes()).unwrap()),
            Err(DatasetError::MissingLabel)
        ));
    }

    #[test]
    fn test_prepare_rejects_bad_date() {
        let csv = "date,latitude,longitude,is_fire\nnot-a-date,21.0,105.0,1\n";
        assert!(matches!(
            prepare(read_csv(csv.as_bytes()).unwrap()),
            Err(DatasetError::Feature(_))
        ));
    }

    #[test]
    fn test_holdout_split_every_kth_row() {
        let (train, test) = holdout_split(10, 5);
        assert_eq!(test, vec![4, 9]);
        assert_eq!(train.len(), 8);

        let (train, test) = holdout_split(3, 0);
        assert_eq!(train, vec![0, 1, 2]);
        assert!(test.is_empty());
    }
}
