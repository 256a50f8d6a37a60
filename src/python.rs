use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::aggregation::AggregationSpec;
use crate::engine::SubtotalEngine;
use crate::model::{ReportConfig, ReportModel};
use crate::schema;

/// Subtotal a DataFrame over every combination of `subtotal_columns`.
///
/// `aggregations` is a list of `(column, reduction)` pairs, e.g.
/// `[("rating", "max"), ("value_ARAP", "sum")]`.
#[pyfunction]
#[pyo3(signature = (data, subtotal_columns, aggregations, sentinel=None))]
fn get_totals(
    data: PyDataFrame,
    subtotal_columns: Vec<String>,
    aggregations: Vec<(String, String)>,
    sentinel: Option<String>,
) -> PyResult<PyDataFrame> {
    let spec = AggregationSpec::parse_pairs(aggregations)?;
    let engine = SubtotalEngine::with_sentinel(sentinel.unwrap_or_else(|| schema::TOTAL.into()));
    let df = engine.totals(&data.0, &subtotal_columns, &spec)?;
    Ok(PyDataFrame(df))
}

/// Run the standard reconciliation report in `base_path` and return the path
/// of the written CSV.
#[pyfunction]
#[pyo3(signature = (base_path, output_file=None))]
fn run_report(base_path: String, output_file: Option<String>) -> PyResult<String> {
    let mut config = ReportConfig::default();
    if let Some(output) = output_file {
        config.output_file = output;
    }
    let path = ReportModel::with_config(base_path, config).run()?;
    Ok(path.display().to_string())
}

#[pymodule]
fn recon_subtotals(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(get_totals, m)?)?;
    m.add_function(wrap_pyfunction!(run_report, m)?)?;
    m.add("TOTAL", schema::TOTAL)?;
    Ok(())
}
