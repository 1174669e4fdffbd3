use std::io::Read;
use std::path::Path;

use cal_types::{CalResult, DataError, Dataset};

/// Loads `x,y` observation pairs from CSV.
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    has_headers: bool,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self { has_headers: false }
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Load a two-column CSV file. Rows that do not parse are an error, not
    /// silently skipped: a partial dataset would change every fit.
    pub fn load_csv_file<P: AsRef<Path>>(&self, file_path: P) -> CalResult<Dataset> {
        let path = file_path.as_ref();
        tracing::info!("Loading dataset from: {}", path.display());

        let file = std::fs::File::open(path).map_err(|e| DataError::LoadingFailed {
            message: format!("Failed to open CSV file {}: {}", path.display(), e),
        })?;
        let data = self.load_csv(file)?;

        tracing::info!("Loaded {} observations from {}", data.len(), path.display());
        Ok(data)
    }

    pub fn load_csv<R: Read>(&self, reader: R) -> CalResult<Dataset> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let first_line = if self.has_headers { 2 } else { 1 };
        let mut x = Vec::new();
        let mut y = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let line = idx + first_line;
            let record = result.map_err(|e| DataError::LoadingFailed {
                message: format!("Failed to read CSV record at line {}: {}", line, e),
            })?;

            if record.len() < 2 {
                return Err(DataError::LoadingFailed {
                    message: format!(
                        "CSV record at line {} has {} columns, expected 2",
                        line,
                        record.len()
                    ),
                }
                .into());
            }

            x.push(Self::parse_value(record.get(0).unwrap_or(""), "x", line)?);
            y.push(Self::parse_value(record.get(1).unwrap_or(""), "y", line)?);
        }

        Ok(Dataset::new(x, y))
    }

    fn parse_value(raw: &str, column: &str, line: usize) -> CalResult<f64> {
        raw.parse::<f64>().map_err(|e| {
            DataError::LoadingFailed {
                message: format!("Invalid {} value '{}' at line {}: {}", column, raw, line, e),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_headerless_pairs() {
        let data = DatasetLoader::new()
            .load_csv("0,100\n10, 150\n20,200\n".as_bytes())
            .unwrap();
        assert_eq!(data.x, vec![0.0, 10.0, 20.0]);
        assert_eq!(data.y, vec![100.0, 150.0, 200.0]);
    }

    #[test]
    fn skips_header_row_when_configured() {
        let data = DatasetLoader::new()
            .with_headers(true)
            .load_csv("x,y\n1.5,2.5\n".as_bytes())
            .unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.x[0], 1.5);
    }

    #[test]
    fn bad_value_reports_line() {
        let err = DatasetLoader::new()
            .load_csv("1,2\n3,oops\n".as_bytes())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("oops"), "{message}");
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0,6.0").unwrap();
        writeln!(file, "2.0,11.0").unwrap();

        let data = DatasetLoader::new().load_csv_file(file.path()).unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn missing_file_is_loading_error() {
        let result = DatasetLoader::new().load_csv_file("/definitely/not/here.csv");
        assert!(matches!(
            result,
            Err(cal_types::CalError::Data(DataError::LoadingFailed { .. }))
        ));
    }
}
