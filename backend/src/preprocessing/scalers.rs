//! Fitted per-column scalers.
//!
//! Both scalers store their parameters alongside the exact column list they
//! were fit on, so a transform always touches the same columns in the same
//! order as the fit did.

use serde::{Deserialize, Serialize};

use super::PreprocessError;
use crate::models::Frame;

/// Median-centre / IQR-scale, matching numpy's linear percentile interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    pub columns: Vec<String>,
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

impl RobustScaler {
    /// Fit over `columns`, all of which must be numeric columns of `frame`.
    /// Non-finite values are ignored when computing percentiles.
    pub fn fit(frame: &Frame, columns: &[String]) -> Result<Self, PreprocessError> {
        let mut center = Vec::with_capacity(columns.len());
        let mut scale = Vec::with_capacity(columns.len());

        for name in columns {
            let values = numeric_column(frame, name)?;
            let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
            if sorted.is_empty() {
                return Err(PreprocessError::EmptyColumn(name.clone()));
            }
            sorted.sort_by(|a, b| a.total_cmp(b));

            let q1 = percentile(&sorted, 0.25);
            let q3 = percentile(&sorted, 0.75);
            center.push(percentile(&sorted, 0.5));
            scale.push(non_zero(q3 - q1));
        }

        Ok(Self {
            columns: columns.to_vec(),
            center,
            scale,
        })
    }

    /// Scale the fitted columns in place. Columns missing from `frame` are
    /// first inserted as zeros so the scaler always sees its full input set.
    pub fn transform(&self, frame: &mut Frame) -> Result<(), PreprocessError> {
        for name in &self.columns {
            frame.fill_missing(name, 0.0);
        }
        apply_affine(frame, &self.columns, &self.center, &self.scale)
    }

    pub(crate) fn validate(&self) -> Result<(), PreprocessError> {
        check_lengths("robust_scaler", &self.columns, &self.center, &self.scale)
    }
}

/// Mean-centre / standard-deviation-scale (population variance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit jointly over `columns`; each column gets its own mean and scale.
    pub fn fit(frame: &Frame, columns: &[String]) -> Result<Self, PreprocessError> {
        let mut mean = Vec::with_capacity(columns.len());
        let mut scale = Vec::with_capacity(columns.len());

        for name in columns {
            let (m, s) = mean_and_scale(name, numeric_column(frame, name)?)?;
            mean.push(m);
            scale.push(s);
        }

        Ok(Self {
            columns: columns.to_vec(),
            mean,
            scale,
        })
    }

    /// Fit a single-column scaler from raw values.
    pub fn fit_values(column: &str, values: &[f64]) -> Result<Self, PreprocessError> {
        let (m, s) = mean_and_scale(column, values)?;
        Ok(Self {
            columns: vec![column.to_string()],
            mean: vec![m],
            scale: vec![s],
        })
    }

    /// Scale the fitted columns in place. Every fitted column must be present.
    pub fn transform(&self, frame: &mut Frame) -> Result<(), PreprocessError> {
        apply_affine(frame, &self.columns, &self.mean, &self.scale)
    }

    /// Scale one value with the parameters of the column at `index`.
    pub fn scale_value(&self, index: usize, value: f64) -> f64 {
        (value - self.mean[index]) / self.scale[index]
    }

    pub(crate) fn validate(&self, stage: &str) -> Result<(), PreprocessError> {
        check_lengths(stage, &self.columns, &self.mean, &self.scale)
    }
}

fn numeric_column<'a>(frame: &'a Frame, name: &str) -> Result<&'a [f64], PreprocessError> {
    if !frame.has(name) {
        return Err(PreprocessError::MissingColumn(name.to_string()));
    }
    frame
        .numeric(name)
        .ok_or_else(|| PreprocessError::NonNumericColumn(name.to_string()))
}

fn mean_and_scale(name: &str, values: &[f64]) -> Result<(f64, f64), PreprocessError> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(PreprocessError::EmptyColumn(name.to_string()));
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let variance = finite.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Ok((mean, non_zero(variance.sqrt())))
}

fn apply_affine(
    frame: &mut Frame,
    columns: &[String],
    offset: &[f64],
    scale: &[f64],
) -> Result<(), PreprocessError> {
    for (i, name) in columns.iter().enumerate() {
        if !frame.has(name) {
            return Err(PreprocessError::MissingColumn(name.clone()));
        }
        let values = frame
            .numeric_mut(name)
            .ok_or_else(|| PreprocessError::NonNumericColumn(name.clone()))?;
        for v in values.iter_mut() {
            *v = (*v - offset[i]) / scale[i];
        }
    }
    Ok(())
}

/// Linear-interpolated percentile over an ascending, non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Constant features keep their offset but are not rescaled.
fn non_zero(scale: f64) -> f64 {
    if scale.abs() < 10.0 * f64::EPSILON {
        1.0
    } else {
        scale
    }
}

fn check_lengths(
    stage: &str,
    columns: &[String],
    a: &[f64],
    b: &[f64],
) -> Result<(), PreprocessError> {
    if columns.len() != a.len() || columns.len() != b.len() {
        return Err(PreprocessError::InvalidState(format!(
            "{}: {} columns but {} / {} parameters",
            stage,
            columns.len(),
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str, values: Vec<f64>) -> Frame {
        let mut f = Frame::with_rows(values.len());
        f.set_numeric(name, values);
        f
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.5), 2.5);
        assert_eq!(percentile(&sorted, 0.25), 1.75);
        assert_eq!(percentile(&sorted, 0.75), 3.25);
        assert_eq!(percentile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn test_robust_scaler_fit_transform() {
        let mut f = frame("x", vec![1.0, 2.0, 3.0, 4.0, 100.0]);
        let scaler = RobustScaler::fit(&f, &["x".to_string()]).unwrap();
        assert_eq!(scaler.center, vec![3.0]);
        assert_eq!(scaler.scale, vec![2.0]);

        scaler.transform(&mut f).unwrap();
        assert_eq!(f.numeric("x"), Some(&[-1.0, -0.5, 0.0, 0.5, 48.5][..]));
    }

    #[test]
    fn test_robust_scaler_zero_fills_missing() {
        let train = frame("x", vec![2.0, 4.0, 6.0]);
        let scaler = RobustScaler::fit(&train, &["x".to_string()]).unwrap();

        let mut serving = Frame::with_rows(1);
        scaler.transform(&mut serving).unwrap();
        // (0 - 4) / 2
        assert_eq!(serving.numeric("x"), Some(&[-2.0][..]));
    }

    #[test]
    fn test_constant_column_is_not_rescaled() {
        let mut f = frame("x", vec![5.0, 5.0, 5.0]);
        let robust = RobustScaler::fit(&f, &["x".to_string()]).unwrap();
        let standard = StandardScaler::fit(&f, &["x".to_string()]).unwrap();
        assert_eq!(robust.scale, vec![1.0]);
        assert_eq!(standard.scale, vec![1.0]);

        standard.transform(&mut f).unwrap();
        assert_eq!(f.numeric("x"), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_standard_scaler_population_std() {
        let mut f = frame("x", vec![1.0, 3.0]);
        let scaler = StandardScaler::fit(&f, &["x".to_string()]).unwrap();
        assert_eq!(scaler.mean, vec![2.0]);
        assert_eq!(scaler.scale, vec![1.0]);
        scaler.transform(&mut f).unwrap();
        assert_eq!(f.numeric("x"), Some(&[-1.0, 1.0][..]));
    }

    #[test]
    fn test_standard_scaler_requires_columns() {
        let f = frame("x", vec![1.0]);
        let scaler = StandardScaler::fit(&f, &["x".to_string()]).unwrap();
        let mut other = frame("y", vec![1.0]);
        assert!(matches!(
            scaler.transform(&mut other),
            Err(PreprocessError::MissingColumn(c)) if c == "x"
        ));
    }

    #[test]
    fn test_fit_rejects_text_column() {
        let mut f = Frame::with_rows(1);
        f.set_text("x", vec!["a".into()]);
        assert!(matches!(
            StandardScaler::fit(&f, &["x".to_string()]),
            Err(PreprocessError::NonNumericColumn(_))
        ));
    }
}
