pub mod aggregation;
pub mod engine;
pub mod error;
pub mod model;
pub mod schema;
pub mod subsets;

#[cfg(feature = "python")]
mod python;

pub use aggregation::{group_aggregate, AggregationSpec, Reduction};
pub use engine::{get_totals, SubsetSummary, SubtotalConfig, SubtotalEngine, SubtotalReport};
pub use error::SubtotalError;
pub use model::{ReportConfig, ReportModel};
pub use subsets::{column_subsets, report_order};
