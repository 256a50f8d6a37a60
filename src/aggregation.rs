use std::fmt;
use std::str::FromStr;

use polars::prelude::*;

use crate::error::SubtotalError;

/// Reduction applied to one value column within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Nulls count as zero.
    Sum,
    Max,
    Min,
    Mean,
    /// Number of non-null values.
    Count,
}

impl Reduction {
    /// Polars expression computing this reduction over `column`, named `column`.
    pub fn expr(self, column: &str) -> Expr {
        let c = col(column);
        let reduced = match self {
            Self::Sum => c.sum(),
            Self::Max => c.max(),
            Self::Min => c.min(),
            Self::Mean => c.mean(),
            Self::Count => c.count(),
        };
        reduced.alias(column)
    }

    /// Whether the target column must hold numbers.
    pub fn requires_numeric(self) -> bool {
        matches!(self, Self::Sum | Self::Mean)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Max => "max",
            Self::Min => "min",
            Self::Mean => "mean",
            Self::Count => "count",
        }
    }
}

impl FromStr for Reduction {
    type Err = SubtotalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            "mean" | "avg" => Ok(Self::Mean),
            "count" => Ok(Self::Count),
            _ => Err(SubtotalError::UnknownReduction(s.to_string())),
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered mapping from value column to reduction.
///
/// Each entry produces one output column named after its key, in insertion
/// order. Duplicate keys are accepted here and rejected by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationSpec {
    entries: Vec<(String, Reduction)>,
}

impl AggregationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `push`.
    pub fn with(mut self, column: impl Into<String>, reduction: Reduction) -> Self {
        self.push(column, reduction);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, reduction: Reduction) {
        self.entries.push((column.into(), reduction));
    }

    /// Parse `(column, "sum")`-style pairs.
    pub fn parse_pairs<I, K, V>(pairs: I) -> Result<Self, SubtotalError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .map(|(column, name)| -> Result<(String, Reduction), SubtotalError> {
                Ok((column.into(), name.as_ref().parse()?))
            })
            .collect()
    }

    /// Parse a `column=reduction` argument.
    pub fn parse_assignment(arg: &str) -> Result<(String, Reduction), SubtotalError> {
        let (column, reduction) = arg.split_once('=').ok_or_else(|| {
            SubtotalError::InvalidData(format!(
                "Expected column=reduction, got '{arg}'"
            ))
        })?;
        Ok((column.trim().to_string(), reduction.parse()?))
    }

    pub fn entries(&self) -> &[(String, Reduction)] {
        &self.entries
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn exprs(&self) -> Vec<Expr> {
        self.entries
            .iter()
            .map(|(column, reduction)| reduction.expr(column))
            .collect()
    }
}

impl FromIterator<(String, Reduction)> for AggregationSpec {
    fn from_iter<T: IntoIterator<Item = (String, Reduction)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Group `df` by the columns of `subset` and reduce every group with `spec`.
///
/// Returns the subset's columns followed by one column per spec entry, one row
/// per distinct key combination, sorted by key with null keys last. Null keys
/// form their own group. An empty `subset` reduces the whole frame to a single
/// row, also when `df` has no rows.
pub fn group_aggregate(
    df: &DataFrame,
    subset: &[String],
    spec: &AggregationSpec,
) -> Result<DataFrame, SubtotalError> {
    let aggs = spec.exprs();
    let lazy = df.clone().lazy();

    if subset.is_empty() {
        return Ok(lazy.select(aggs).collect()?);
    }

    let keys: Vec<Expr> = subset.iter().map(|c| col(c)).collect();
    let grouped = lazy
        .group_by(keys.clone())
        .agg(aggs)
        .sort_by_exprs(
            keys,
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;

    Ok(grouped)
}
