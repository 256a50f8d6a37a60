use std::path::PathBuf;

use polars::prelude::*;
use tracing::{debug, info};

use crate::aggregation::{AggregationSpec, Reduction};
use crate::engine::{SubtotalConfig, SubtotalEngine, SubtotalReport};
use crate::error::SubtotalError;
use crate::schema::{self, dataset, files, report, status};

/// Everything the reconciliation report needs to know about its inputs.
///
/// Defaults reproduce the standard report: `dataset1.csv` joined with
/// `dataset2.csv` on `counter_party`, `value` split into `value_ARAP` and
/// `value_ACCR`, subtotalled over legal entity, counterparty and tier.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub left_file: String,
    pub right_file: String,
    pub output_file: String,
    pub join_key: String,
    pub status_column: String,
    pub value_column: String,
    /// One `<value>_<category>` column is derived per category.
    pub status_categories: Vec<String>,
    /// Parsed to Int64 after loading.
    pub integer_columns: Vec<String>,
    pub dimensions: Vec<String>,
    pub aggregations: AggregationSpec,
    /// Applied to the report just before it is written.
    pub renames: Vec<(String, String)>,
    pub sentinel: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            left_file: files::LEFT.to_string(),
            right_file: files::RIGHT.to_string(),
            output_file: files::OUTPUT.to_string(),
            join_key: dataset::COUNTER_PARTY.to_string(),
            status_column: dataset::STATUS.to_string(),
            value_column: dataset::VALUE.to_string(),
            status_categories: status::ALL.iter().map(|s| s.to_string()).collect(),
            integer_columns: vec![dataset::RATING.to_string()],
            dimensions: report::DIMENSIONS.iter().map(|s| s.to_string()).collect(),
            aggregations: AggregationSpec::new()
                .with(dataset::RATING, Reduction::Max)
                .with(report::VALUE_ARAP, Reduction::Sum)
                .with(report::VALUE_ACCR, Reduction::Sum),
            renames: vec![(dataset::RATING.to_string(), report::RATING_MAX.to_string())],
            sentinel: schema::TOTAL.to_string(),
        }
    }
}

/// Loads the two datasets, prepares the flat table and runs the subtotal
/// engine over it.
pub struct ReportModel {
    base_path: PathBuf,
    config: ReportConfig,
    engine: SubtotalEngine,
}

impl ReportModel {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self::with_config(base_path, ReportConfig::default())
    }

    pub fn with_config(base_path: impl Into<PathBuf>, config: ReportConfig) -> Self {
        let engine = SubtotalEngine::new(SubtotalConfig {
            sentinel: config.sentinel.clone(),
        });
        Self {
            base_path: base_path.into(),
            config,
            engine,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Read a CSV file with all columns as String dtype.
    /// Trims whitespace from column names.
    pub fn load_csv(&self, filename: &str) -> Result<DataFrame, SubtotalError> {
        let path = self.base_path.join(filename);
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed.as_slice())?;

        debug!(file = filename, rows = df.height(), "loaded csv");
        Ok(df)
    }

    // ── Preparation ─────────────────────────────────────────────────────────

    /// Inner join on the configured key. Rows without a partner are dropped.
    pub fn merge(&self, left: DataFrame, right: DataFrame) -> Result<DataFrame, SubtotalError> {
        let key = self.config.join_key.as_str();
        Self::require_columns(&left, &[key])?;
        Self::require_columns(&right, &[key])?;

        let df = left
            .lazy()
            .join(
                right.lazy(),
                [col(key)],
                [col(key)],
                JoinArgs::new(JoinType::Inner),
            )
            .collect()?;

        Ok(df)
    }

    /// Parse the value column to Float64 and add one column per status
    /// category holding the value where the status matches, else 0.
    pub fn split_by_status(&self, df: DataFrame) -> Result<DataFrame, SubtotalError> {
        let value = self.config.value_column.as_str();
        let status = self.config.status_column.as_str();
        Self::require_columns(&df, &[value, status])?;

        let mut df = df;
        let parsed = Self::parse_numeric(&df, value, DataType::Float64)?;
        df.with_column(parsed)?;

        let derived: Vec<Expr> = self
            .config
            .status_categories
            .iter()
            .map(|category| {
                when(col(status).eq(lit(category.as_str())))
                    .then(col(value))
                    .otherwise(lit(0.0))
                    .alias(schema::status_column(value, category))
            })
            .collect();

        let df = df
            .lazy()
            .with_columns(derived)
            .collect()?;

        Ok(df)
    }

    /// Parse the configured integer columns to Int64.
    pub fn parse_integer_columns(&self, df: DataFrame) -> Result<DataFrame, SubtotalError> {
        let names: Vec<&str> = self.config.integer_columns.iter().map(|c| c.as_str()).collect();
        Self::require_columns(&df, &names)?;

        let mut df = df;
        for name in names {
            let parsed = Self::parse_numeric(&df, name, DataType::Int64)?;
            df.with_column(parsed)?;
        }

        Ok(df)
    }

    /// Load both inputs and produce the flat table the engine runs on.
    pub fn prepare(&self) -> Result<DataFrame, SubtotalError> {
        let left = self.load_csv(&self.config.left_file)?;
        let right = self.load_csv(&self.config.right_file)?;

        let merged = self.merge(left, right)?;
        let split = self.split_by_status(merged)?;
        self.parse_integer_columns(split)
    }

    // ── Report ──────────────────────────────────────────────────────────────

    pub fn build(&self) -> Result<SubtotalReport, SubtotalError> {
        let prepared = self.prepare()?;
        self.engine
            .run(&prepared, &self.config.dimensions, &self.config.aggregations)
    }

    /// Apply the configured renames and write `report` as CSV under the base
    /// path. Returns the written path.
    pub fn write_report(
        &self,
        report: DataFrame,
        filename: &str,
    ) -> Result<PathBuf, SubtotalError> {
        let mut df = if self.config.renames.is_empty() {
            report
        } else {
            let old: Vec<&str> = self.config.renames.iter().map(|(o, _)| o.as_str()).collect();
            let new: Vec<&str> = self.config.renames.iter().map(|(_, n)| n.as_str()).collect();
            report.lazy().rename(old, new, true).collect()?
        };

        let path = self.base_path.join(filename);
        let mut file = std::fs::File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        info!(path = %path.display(), rows = df.height(), "wrote report");
        Ok(path)
    }

    /// Build the report and write it to the configured output file.
    pub fn run(&self) -> Result<PathBuf, SubtotalError> {
        let report = self.build()?;
        self.write_report(report.frame, &self.config.output_file)
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

impl ReportModel {
    fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), SubtotalError> {
        for &col_name in required {
            if df.column(col_name).is_err() {
                return Err(SubtotalError::MissingColumn(col_name.to_string()));
            }
        }
        Ok(())
    }

    /// Parse `column` to `dtype`; text is stripped of surrounding whitespace
    /// first. A non-null cell that does not parse is an error.
    fn parse_numeric(
        df: &DataFrame,
        column: &str,
        dtype: DataType,
    ) -> Result<Column, SubtotalError> {
        let source = df.column(column)?;
        let expr = if source.dtype() == &DataType::String {
            col(column).str().strip_chars(lit(" \t\r\n")).cast(dtype.clone())
        } else {
            col(column).cast(dtype.clone())
        };
        let parsed = df
            .clone()
            .lazy()
            .select([expr.alias(column)])
            .collect()?
            .column(column)?
            .clone();

        if parsed.null_count() > source.null_count() {
            for i in 0..source.len() {
                let raw = source.get(i)?;
                if !raw.is_null() && parsed.get(i)?.is_null() {
                    let cell = match raw {
                        AnyValue::String(s) => s.to_string(),
                        other => other.to_string(),
                    };
                    return Err(SubtotalError::InvalidData(format!(
                        "Column '{column}' row {i}: cannot parse '{cell}' as {dtype}"
                    )));
                }
            }
        }

        Ok(parsed)
    }
}
