//! Point samples of a raster stack as a `polars` table.

use crate::processing::error::ProcessError;
use crate::raster::frame::Frame;
use crate::raster::stack::RasterStack;
use crate::types::extent::LonLat;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Values sampled from every frame of a stack at every requested point.
///
/// The wrapped [`DataFrame`] has one row per point with columns `point`
/// (input index), `lon` and `lat`, followed by one nullable `f64` column per
/// frame date named `YYYY-MM-DD`, in date order. Points outside a frame's
/// coverage or on no-data hold nulls.
#[derive(Debug, Clone)]
pub struct PointTable {
    /// The underlying Polars DataFrame.
    pub frame: DataFrame,
}

impl PointTable {
    /// Builds the table from per-date samples. `samples[d][p]` is the value of
    /// point `p` on `dates[d]`.
    pub fn from_samples(
        points: &[LonLat],
        dates: &[NaiveDate],
        samples: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, ProcessError> {
        let mut columns = Vec::with_capacity(3 + dates.len());
        columns.push(Column::new(
            "point".into(),
            (0..points.len() as u32).collect::<Vec<u32>>(),
        ));
        columns.push(Column::new(
            "lon".into(),
            points.iter().map(|p| p.lon()).collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "lat".into(),
            points.iter().map(|p| p.lat()).collect::<Vec<f64>>(),
        ));
        for (date, values) in dates.iter().zip(samples) {
            columns.push(Column::new(
                date.format(DATE_FORMAT).to_string().into(),
                values,
            ));
        }
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Samples every frame of `stack` at `points` with `sample`.
    pub(crate) fn sample_stack<F>(
        stack: &RasterStack,
        points: &[LonLat],
        mut sample: F,
    ) -> Result<Self, ProcessError>
    where
        F: FnMut(&Frame) -> Result<Vec<Option<f64>>, ProcessError>,
    {
        let samples = stack
            .frames()
            .iter()
            .map(&mut sample)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_samples(points, &stack.dates(), samples)
    }

    pub fn num_points(&self) -> usize {
        self.frame.height()
    }

    /// Frame dates, in column order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.frame
            .get_column_names()
            .iter()
            .filter_map(|name| NaiveDate::parse_from_str(name.as_str(), DATE_FORMAT).ok())
            .collect()
    }

    /// Value of point `point` on `date`, `None` for nulls or unknown dates.
    pub fn value(&self, point: usize, date: NaiveDate) -> Result<Option<f64>, PolarsError> {
        let name = date.format(DATE_FORMAT).to_string();
        match self.frame.column(&name) {
            Ok(column) => Ok(column.f64()?.get(point)),
            Err(PolarsError::ColumnNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ProcessError> {
        let mut file =
            File::create(path).map_err(|e| ProcessError::FileCreate(path.to_path_buf(), e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut self.frame.clone())
            .map_err(|e| ProcessError::TableWrite(path.to_path_buf(), e))
    }

    pub fn write_parquet(&self, path: &Path) -> Result<(), ProcessError> {
        let file =
            File::create(path).map_err(|e| ProcessError::FileCreate(path.to_path_buf(), e))?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut self.frame.clone())
            .map(|_| ())
            .map_err(|e| ProcessError::TableWrite(path.to_path_buf(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table() -> PointTable {
        let points = [LonLat(5.0, 52.0), LonLat(6.0, 51.0)];
        let dates = [
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        ];
        PointTable::from_samples(
            &points,
            &dates,
            vec![vec![Some(1.0), None], vec![Some(3.0), Some(4.0)]],
        )
        .unwrap()
    }

    #[test]
    fn test_columns_and_values() -> Result<(), PolarsError> {
        let table = table();
        let names: Vec<String> = table
            .frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["point", "lon", "lat", "2025-01-01", "2025-02-01"]);
        let jan = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(table.value(0, jan)?, Some(1.0));
        assert_eq!(table.value(1, jan)?, None);
        assert_eq!(table.dates().len(), 2);
        assert_eq!(
            table.value(0, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())?,
            None
        );
        Ok(())
    }

    #[test]
    fn test_write_csv_and_parquet() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let table = table();
        let csv = dir.path().join("points.csv");
        let parquet = dir.path().join("points.parquet");
        table.write_csv(&csv)?;
        table.write_parquet(&parquet)?;

        let header = std::fs::read_to_string(&csv)?;
        assert!(header.starts_with("point,lon,lat,2025-01-01,2025-02-01"));
        let read_back = ParquetReader::new(File::open(&parquet)?).finish()?;
        assert_eq!(read_back.shape(), (2, 5));
        Ok(())
    }
}
