//! Column-name constants for the reconciliation report.
//! Single source of truth for the defaults in `ReportConfig`.

// ── Sentinel ────────────────────────────────────────────────────────────────
pub const TOTAL: &str = "Total";

// ── Dataset columns ─────────────────────────────────────────────────────────
pub mod dataset {
    pub const LEGAL_ENTITY: &str = "legal_entity";
    pub const COUNTER_PARTY: &str = "counter_party";
    pub const TIER: &str = "tier";
    pub const RATING: &str = "rating";
    pub const STATUS: &str = "status";
    pub const VALUE: &str = "value";
}

// ── Status categories ───────────────────────────────────────────────────────
pub mod status {
    pub const ARAP: &str = "ARAP";
    pub const ACCR: &str = "ACCR";

    pub const ALL: [&str; 2] = [ARAP, ACCR];
}

// ── Report columns ──────────────────────────────────────────────────────────
pub mod report {
    pub const VALUE_ARAP: &str = "value_ARAP";
    pub const VALUE_ACCR: &str = "value_ACCR";
    pub const RATING_MAX: &str = "rating_MAX";

    pub const DIMENSIONS: [&str; 3] = [
        super::dataset::LEGAL_ENTITY,
        super::dataset::COUNTER_PARTY,
        super::dataset::TIER,
    ];
}

// ── Default file names ──────────────────────────────────────────────────────
pub mod files {
    pub const LEFT: &str = "dataset1.csv";
    pub const RIGHT: &str = "dataset2.csv";
    pub const OUTPUT: &str = "output.csv";
}

/// Name of the per-category value column, e.g. `value_ARAP`.
pub fn status_column(value_column: &str, category: &str) -> String {
    format!("{value_column}_{category}")
}
