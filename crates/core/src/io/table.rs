//! Column-addressable CSV tables
//!
//! The input summary, the reference cell catalog and the zonal summary are
//! all small header-first CSV files. `Table` keeps every field as text and
//! parses columns on demand, so unknown columns survive a read/write cycle
//! untouched.

use crate::error::{Error, Result};
use crate::io::atomic::write_atomically;
use std::path::{Path, PathBuf};

/// A CSV table held in memory as text fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    source: Option<PathBuf>,
}

impl Table {
    /// Empty table with the given header row
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            source: None,
        }
    }

    /// Read a CSV file with a header row
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::missing_input(path, "CSV table does not exist"));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(String::from).collect());
        }

        Ok(Self {
            headers,
            rows,
            source: Some(path.to_path_buf()),
        })
    }

    /// Write the table as CSV, replacing `path` atomically
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomically(path, |file| {
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
            Ok(())
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Append a data row. The row must match the header width.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(Error::InvalidParameter {
                name: "row",
                value: format!("{} fields", row.len()),
                reason: format!("table has {} columns", self.headers.len()),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Raw text of a column
    pub fn text_column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.require(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Parse a column as floats. Empty fields and `NaN`/`NA` become NaN.
    pub fn f64_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.require(name)?;
        self.rows
            .iter()
            .map(|row| parse_float(&row[idx]).ok_or_else(|| self.bad_field(name, &row[idx])))
            .collect()
    }

    /// Parse a column as integers. Integral floats such as `515902.0` are accepted.
    pub fn i64_column(&self, name: &str) -> Result<Vec<i64>> {
        let idx = self.require(name)?;
        self.rows
            .iter()
            .map(|row| parse_int(&row[idx]).ok_or_else(|| self.bad_field(name, &row[idx])))
            .collect()
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
            path: self.source.clone().unwrap_or_default(),
        })
    }

    fn bad_field(&self, column: &str, value: &str) -> Error {
        let origin = self
            .source
            .as_ref()
            .map(|p| format!(" in {}", p.display()))
            .unwrap_or_default();
        Error::Other(format!(
            "cannot parse '{}' in column '{}'{}",
            value, column, origin
        ))
    }
}

/// Format a float for a CSV field; NaN is written as an empty field.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "" | "NA" | "NaN" | "nan" | "null" => Some(f64::NAN),
        _ => text.parse().ok(),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        let v: f64 = text.parse().ok()?;
        (v.fract() == 0.0 && v.is_finite()).then_some(v as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "\
STATION_ID,STATION_LAT,STATION_LON,GRIDMET_ID,Annual_mean
A,45.1,-110.2,515902.0,1.02
B,45.3,-110.0,514516,
";

    #[test]
    fn test_read_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etr_mm_summary_comp.csv");
        std::fs::write(&path, SUMMARY).unwrap();

        let table = Table::read_csv(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.text_column("STATION_ID").unwrap(), vec!["A", "B"]);
        assert_eq!(table.i64_column("GRIDMET_ID").unwrap(), vec![515902, 514516]);

        let annual = table.f64_column("Annual_mean").unwrap();
        assert_eq!(annual[0], 1.02);
        assert!(annual[1].is_nan());
    }

    #[test]
    fn test_missing_column_names_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridmet_cell_data.csv");
        std::fs::write(&path, "GRIDMET_ID,LON\n1,-110.0\n").unwrap();

        let table = Table::read_csv(&path).unwrap();
        match table.f64_column("LAT") {
            Err(Error::MissingColumn { column, path: p }) => {
                assert_eq!(column, "LAT");
                assert_eq!(p, path);
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(["GRIDMET_ID", "Jan_mean"]);
        table.push_row(vec!["7".into(), format_float(0.25)]).unwrap();
        table.push_row(vec!["8".into(), format_float(f64::NAN)]).unwrap();
        assert!(table.push_row(vec!["9".into()]).is_err());
        table.write_csv(&path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "GRIDMET_ID,Jan_mean\n7,0.25\n8,\n"
        );
    }

    #[test]
    fn test_unparseable_field() {
        let mut table = Table::new(["LON"]);
        table.push_row(vec!["west".into()]).unwrap();
        assert!(table.f64_column("LON").is_err());
    }
}
