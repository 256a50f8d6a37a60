use std::collections::HashSet;

use polars::prelude::*;
use tracing::{debug, info};

use crate::aggregation::{group_aggregate, AggregationSpec};
use crate::error::SubtotalError;
use crate::schema::TOTAL;
use crate::subsets::report_order;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct SubtotalConfig {
    /// Label written into dimension columns a subset does not group by.
    pub sentinel: String,
}

impl Default for SubtotalConfig {
    fn default() -> Self {
        Self {
            sentinel: TOTAL.to_string(),
        }
    }
}

/// Rows one subset contributed to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetSummary {
    /// Grouped columns; empty for the grand total.
    pub columns: Vec<String>,
    pub rows: usize,
}

#[derive(Debug, Clone)]
pub struct SubtotalReport {
    pub frame: DataFrame,
    /// In assembly order: largest subset first, grand total last.
    pub subsets: Vec<SubsetSummary>,
}

impl SubtotalReport {
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }
}

/// Builds subtotal reports: one aggregate per combination of dimensions plus
/// a grand total, concatenated into a single frame.
///
/// Output columns are the dimensions in the given order followed by one
/// column per aggregation entry. Dimensions a subset does not group by hold
/// the sentinel; nulls in grouped columns are kept as nulls.
#[derive(Debug, Clone, Default)]
pub struct SubtotalEngine {
    config: SubtotalConfig,
}

impl SubtotalEngine {
    pub fn new(config: SubtotalConfig) -> Self {
        Self { config }
    }

    pub fn with_sentinel(sentinel: impl Into<String>) -> Self {
        Self::new(SubtotalConfig {
            sentinel: sentinel.into(),
        })
    }

    pub fn sentinel(&self) -> &str {
        &self.config.sentinel
    }

    /// Subtotal `df` over every subset of `dimensions`.
    ///
    /// Dimension columns must be `String`; `sum`/`mean` targets must be
    /// numeric. The input frame is left untouched.
    pub fn run<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        dimensions: &[S],
        spec: &AggregationSpec,
    ) -> Result<SubtotalReport, SubtotalError> {
        let dimensions: Vec<String> = dimensions.iter().map(|d| d.as_ref().to_string()).collect();
        self.validate(df, &dimensions, spec)?;

        let mut partials = Vec::new();
        let mut subsets = Vec::new();

        for subset in report_order(&dimensions) {
            let grouped = group_aggregate(df, &subset, spec)?;
            let partial = self.fill_sentinel(&grouped, &subset, &dimensions, spec)?;
            debug!(subset = ?subset, rows = partial.height(), "aggregated subset");

            subsets.push(SubsetSummary {
                columns: subset,
                rows: partial.height(),
            });
            partials.push(partial.lazy());
        }

        let frame = concat(
            partials,
            UnionArgs {
                parallel: false,
                to_supertypes: true,
                ..Default::default()
            },
        )?
        .collect()?;

        info!(
            dimensions = dimensions.len(),
            subsets = subsets.len(),
            rows = frame.height(),
            "assembled subtotal report"
        );

        Ok(SubtotalReport { frame, subsets })
    }

    /// Same as [`run`](Self::run), returning only the frame.
    pub fn totals<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        dimensions: &[S],
        spec: &AggregationSpec,
    ) -> Result<DataFrame, SubtotalError> {
        Ok(self.run(df, dimensions, spec)?.into_frame())
    }

    fn validate(
        &self,
        df: &DataFrame,
        dimensions: &[String],
        spec: &AggregationSpec,
    ) -> Result<(), SubtotalError> {
        if spec.is_empty() {
            return Err(SubtotalError::EmptyAggregation);
        }

        let mut seen = HashSet::new();
        for dim in dimensions {
            if !seen.insert(dim.as_str()) {
                return Err(SubtotalError::DuplicateDimension(dim.clone()));
            }

            let column = df
                .column(dim)
                .map_err(|_| SubtotalError::MissingColumn(dim.clone()))?;
            if column.dtype() != &DataType::String {
                return Err(SubtotalError::TypeMismatch {
                    column: dim.clone(),
                    expected: "String",
                    found: column.dtype().to_string(),
                });
            }

            let sentinel = self.sentinel();
            if column.str()?.into_iter().any(|v| v == Some(sentinel)) {
                return Err(SubtotalError::SentinelCollision {
                    column: dim.clone(),
                    sentinel: sentinel.to_string(),
                });
            }
        }

        let mut targets = HashSet::new();
        for (name, reduction) in spec.entries() {
            if !targets.insert(name.as_str()) {
                return Err(SubtotalError::DuplicateAggregation(name.clone()));
            }
            if seen.contains(name.as_str()) {
                return Err(SubtotalError::OverlappingColumn(name.clone()));
            }

            let column = df
                .column(name)
                .map_err(|_| SubtotalError::MissingColumn(name.clone()))?;
            if reduction.requires_numeric() && !column.dtype().is_primitive_numeric() {
                return Err(SubtotalError::TypeMismatch {
                    column: name.clone(),
                    expected: "numeric",
                    found: column.dtype().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Lay out one subset's aggregate in report column order, writing the
    /// sentinel into dimensions outside `subset`.
    fn fill_sentinel(
        &self,
        grouped: &DataFrame,
        subset: &[String],
        dimensions: &[String],
        spec: &AggregationSpec,
    ) -> Result<DataFrame, SubtotalError> {
        let height = grouped.height();
        let mut columns: Vec<Column> = Vec::with_capacity(dimensions.len() + spec.len());

        for dim in dimensions {
            if subset.contains(dim) {
                columns.push(grouped.column(dim)?.clone());
            } else {
                let filled = vec![self.sentinel(); height];
                columns.push(Column::new(dim.into(), filled));
            }
        }
        for name in spec.columns() {
            columns.push(grouped.column(name)?.clone());
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Subtotal with the default `"Total"` sentinel.
pub fn get_totals<S: AsRef<str>>(
    df: &DataFrame,
    dimensions: &[S],
    spec: &AggregationSpec,
) -> Result<DataFrame, SubtotalError> {
    SubtotalEngine::default().totals(df, dimensions, spec)
}
