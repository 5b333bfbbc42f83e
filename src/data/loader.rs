// ============================================================
// Layer 4 — CSV Sample Loader
// ============================================================
// Reads labelled samples from a local CSV file:
//
//   label,f1,f2,...,fn
//   5,0,0,12,255,...
//
// - A first line whose label column is not a number at all is
//   taken to be a header and skipped. Numeric labels that are not
//   class indices (-1, 1.0) are errors on every line.
// - Every row must have the same number of features.
// - Each feature is divided by `scale` (e.g. 255 for raw pixel
//   intensities).
//
// No downloading happens here; the file must already exist.

use anyhow::{bail, ensure, Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::{sample::Sample, traits::SampleSource};

pub struct CsvSampleLoader {
    path:  PathBuf,
    scale: f32,
}

impl CsvSampleLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), scale: 1.0 }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    fn parse(&self, text: &str) -> Result<Vec<Sample>> {
        ensure!(self.scale != 0.0, "feature scale must be non-zero");

        let mut samples: Vec<Sample> = Vec::new();
        let mut width: Option<usize> = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line    = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split(',').map(str::trim);
            let label_field = fields.next().unwrap_or_default();
            let label = match label_field.parse::<usize>() {
                Ok(label) => label,
                Err(_) if index == 0 && label_field.parse::<f64>().is_err() => {
                    tracing::debug!("Skipping header line in '{}'", self.path.display());
                    continue;
                }
                Err(_) => bail!("line {line_no}: invalid label '{label_field}'"),
            };

            let features = fields
                .map(|f| {
                    f.parse::<f32>()
                        .map(|v| v / self.scale)
                        .with_context(|| format!("line {line_no}: invalid feature '{f}'"))
                })
                .collect::<Result<Vec<f32>>>()?;

            match width {
                None => width = Some(features.len()),
                Some(w) if w != features.len() => bail!(
                    "line {line_no}: expected {w} features, found {}",
                    features.len()
                ),
                Some(_) => {}
            }
            ensure!(!features.is_empty(), "line {line_no}: row has no features");

            samples.push(Sample::new(features, label));
        }

        Ok(samples)
    }
}

impl SampleSource for CsvSampleLoader {
    fn load_all(&self) -> Result<Vec<Sample>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read samples from '{}'", self.path.display()))?;
        let samples = self
            .parse(&text)
            .with_context(|| format!("Malformed sample file '{}'", self.path.display()))?;
        tracing::info!("Loaded {} samples from '{}'", samples.len(), self.path.display());
        Ok(samples)
    }

    fn describe(&self) -> String {
        format!("csv file '{}'", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header_and_scale() {
        let loader  = CsvSampleLoader::new("inline.csv").with_scale(255.0);
        let samples = loader
            .parse("label,p0,p1\n3,0,255\n\n1,51,102\n")
            .expect("valid csv");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label, 3);
        assert_eq!(samples[0].features, vec![0.0, 1.0]);
        assert_eq!(samples[1].features, vec![0.2, 0.4]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = CsvSampleLoader::new("inline.csv")
            .parse("0,1,2\n1,3\n")
            .expect_err("ragged");
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_numeric_first_label_is_not_a_header() {
        let loader = CsvSampleLoader::new("inline.csv");
        let err = loader.parse("-1,0.5\n0,0.25\n").expect_err("negative label");
        assert!(err.to_string().contains("line 1"));
        assert!(loader.parse("1.0,0.5\n0,0.25\n").is_err());
    }

    #[test]
    fn test_bad_label_after_first_line() {
        assert!(CsvSampleLoader::new("inline.csv").parse("0,1\nx,2\n").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = CsvSampleLoader::new(dir.path().join("absent.csv"));
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("train.csv");
        fs::write(&path, "1,0.5,0.25\n0,0.0,1.0\n").expect("write csv");
        let samples = CsvSampleLoader::new(&path).load_all().expect("valid csv");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].label, 0);
    }
}
