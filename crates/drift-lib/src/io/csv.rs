#[cfg(feature = "polars")]
pub mod polars_io {
    use anyhow::Result;
    use polars::prelude::*;

    /// Load the signed deviation column of a deltas CSV as an f64 vector.
    /// Assumes a header row with a "Delta (ms)" column.
    pub fn load_delta_column(path: &str) -> Result<Vec<f64>> {
        let df = CsvReadOptions::default()
            .try_into_reader_with_file_path(Some(path.into()))?
            .finish()?;
        let s = df.column("Delta (ms)")?.cast(&DataType::Float64)?;
        Ok(s.f64()?.into_no_null_iter().collect())
    }
}
