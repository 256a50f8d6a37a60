use polars::prelude::*;
use recon_subtotals::{get_totals, AggregationSpec, Reduction, SubtotalEngine};

const DIMS: [&str; 3] = ["legal_entity", "counter_party", "tier"];

fn ledger() -> DataFrame {
    df!(
        "legal_entity" => ["L1", "L1", "L1", "L2", "L2", "L3", "L1"],
        "counter_party" => ["C1", "C1", "C2", "C1", "C3", "C3", "C3"],
        "tier" => ["1", "1", "2", "1", "3", "3", "3"],
        "rating" => [3i64, 5, 1, 2, 4, 4, 6],
        "value_ARAP" => [10.0, 0.0, 5.0, 7.0, 0.0, 1.5, 2.0],
        "value_ACCR" => [0.0, 20.0, 0.0, 0.0, 9.0, 0.0, 0.5],
    )
    .unwrap()
}

fn spec() -> AggregationSpec {
    AggregationSpec::new()
        .with("rating", Reduction::Max)
        .with("value_ARAP", Reduction::Sum)
        .with("value_ACCR", Reduction::Sum)
}

/// Rows where exactly the dimensions in `grouped` are not the sentinel.
fn subset_rows(report: &DataFrame, grouped: &[&str]) -> DataFrame {
    let mut mask = lit(true);
    for dim in DIMS {
        let is_total = col(dim).eq(lit("Total"));
        let cond = if grouped.contains(&dim) {
            is_total.not()
        } else {
            is_total
        };
        mask = mask.and(cond);
    }
    report.clone().lazy().filter(mask).collect().unwrap()
}

fn f64_sum(df: &DataFrame, column: &str) -> f64 {
    df.column(column)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .sum()
}

#[test]
fn processes_two_pow_n_subsets() {
    let engine = SubtotalEngine::default();
    for n in 0..=DIMS.len() {
        let report = engine.run(&ledger(), &DIMS[..n], &spec()).unwrap();
        assert_eq!(report.subsets.len(), 1 << n);

        let total: usize = report.subsets.iter().map(|s| s.rows).sum();
        assert_eq!(total, report.frame.height());
    }
}

#[test]
fn column_order_follows_dimensions_then_spec() {
    let out = get_totals(&ledger(), &DIMS, &spec()).unwrap();
    assert_eq!(
        out.get_column_names_str(),
        [
            "legal_entity",
            "counter_party",
            "tier",
            "rating",
            "value_ARAP",
            "value_ACCR"
        ]
    );
}

#[test]
fn full_subset_rows_never_hold_sentinel() {
    let report = SubtotalEngine::default().run(&ledger(), &DIMS, &spec()).unwrap();
    let full = &report.subsets[0];
    assert_eq!(full.columns, DIMS);

    let head = report.frame.head(Some(full.rows));
    for dim in DIMS {
        let values = head.column(dim).unwrap().str().unwrap();
        assert!(values.into_iter().all(|v| v != Some("Total")));
    }
}

#[test]
fn grand_total_is_single_last_row() {
    let report = SubtotalEngine::default().run(&ledger(), &DIMS, &spec()).unwrap();
    let last = report.subsets.last().unwrap();
    assert!(last.columns.is_empty());
    assert_eq!(last.rows, 1);

    let grand = subset_rows(&report.frame, &[]);
    assert_eq!(grand.height(), 1);
    assert_eq!(grand.column("rating").unwrap().i64().unwrap().get(0), Some(6));
    assert_eq!(f64_sum(&grand, "value_ARAP"), 25.5);
    assert_eq!(f64_sum(&grand, "value_ACCR"), 29.5);

    let tail = report.frame.tail(Some(1));
    for dim in DIMS {
        assert_eq!(tail.column(dim).unwrap().str().unwrap().get(0), Some("Total"));
    }
}

#[test]
fn single_dimension_subtotals_add_up_to_grand_total() {
    let report = get_totals(&ledger(), &DIMS, &spec()).unwrap();
    let grand = subset_rows(&report, &[]);

    for dim in DIMS {
        let partition = subset_rows(&report, &[dim]);
        for value in ["value_ARAP", "value_ACCR"] {
            assert_eq!(
                f64_sum(&partition, value),
                f64_sum(&grand, value),
                "{dim}/{value}"
            );
        }
    }
}

#[test]
fn every_subset_has_one_row_per_combination() {
    let report = get_totals(&ledger(), &DIMS, &spec()).unwrap();

    // legal_entity x counter_party: (L1,C1) (L1,C2) (L1,C3) (L2,C1) (L2,C3) (L3,C3)
    assert_eq!(subset_rows(&report, &["legal_entity", "counter_party"]).height(), 6);
    assert_eq!(subset_rows(&report, &["counter_party", "tier"]).height(), 3);
    assert_eq!(subset_rows(&report, &["tier"]).height(), 3);
    assert_eq!(report.height(), 6 + 6 + 6 + 3 + 3 + 3 + 3 + 1);
}

#[test]
fn repeated_runs_are_identical() {
    let df = ledger();
    let first = get_totals(&df, &DIMS, &spec()).unwrap();
    let second = get_totals(&df, &DIMS, &spec()).unwrap();
    assert!(first.equals_missing(&second));
}

#[test]
fn max_picks_highest_rating_per_group() {
    let report = get_totals(&ledger(), &DIMS, &spec()).unwrap();
    let by_entity = subset_rows(&report, &["legal_entity"]);

    let entities = by_entity.column("legal_entity").unwrap().str().unwrap();
    let ratings = by_entity.column("rating").unwrap().i64().unwrap();
    let pairs: Vec<(&str, i64)> = entities
        .into_iter()
        .zip(ratings.into_iter())
        .map(|(e, r)| (e.unwrap(), r.unwrap()))
        .collect();
    assert_eq!(pairs, [("L1", 6), ("L2", 4), ("L3", 4)]);
}
