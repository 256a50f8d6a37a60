/// All non-empty combinations of `columns`, smallest first.
///
/// `[A, B, C]` -> `[A], [B], [C], [A, B], [A, C], [B, C], [A, B, C]`.
/// Each subset keeps the column order of the input; within a size, subsets
/// are ordered by the positions of their columns.
pub fn column_subsets<S: AsRef<str>>(columns: &[S]) -> Vec<Vec<String>> {
    let n = columns.len();
    let mut subsets = Vec::with_capacity((1usize << n).saturating_sub(1));

    for size in 1..=n {
        // Index combinations of `size` positions, lexicographic.
        let mut idx: Vec<usize> = (0..size).collect();
        loop {
            subsets.push(idx.iter().map(|&i| columns[i].as_ref().to_string()).collect());

            // Rightmost position that can still move forward.
            let Some(pos) = (0..size).rev().find(|&p| idx[p] < n - size + p) else {
                break;
            };
            idx[pos] += 1;
            for p in pos + 1..size {
                idx[p] = idx[p - 1] + 1;
            }
        }
    }

    subsets
}

/// Order in which the report is assembled: largest subsets first, the empty
/// subset (grand total) last. Subsets of equal size keep enumeration order.
pub fn report_order<S: AsRef<str>>(columns: &[S]) -> Vec<Vec<String>> {
    let mut ordered = column_subsets(columns);
    // Stable sort keeps the within-size order.
    ordered.sort_by(|a, b| b.len().cmp(&a.len()));
    ordered.push(Vec::new());
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(subsets: &[Vec<String>]) -> Vec<String> {
        subsets.iter().map(|s| s.join(",")).collect()
    }

    #[test]
    fn three_columns_by_size_then_position() {
        let subsets = column_subsets(&["A", "B", "C"]);
        assert_eq!(
            names(&subsets),
            ["A", "B", "C", "A,B", "A,C", "B,C", "A,B,C"]
        );
    }

    #[test]
    fn subset_count_is_two_pow_n_minus_one() {
        for n in 0..=5 {
            let cols: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
            assert_eq!(column_subsets(&cols).len(), (1 << n) - 1);
            assert_eq!(report_order(&cols).len(), 1 << n);
        }
    }

    #[test]
    fn subsets_never_reorder_columns() {
        let cols = ["tier", "legal_entity", "counter_party", "desk"];
        for subset in column_subsets(&cols) {
            let positions: Vec<usize> = subset
                .iter()
                .map(|c| cols.iter().position(|x| x == c).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{subset:?}");
        }
    }

    #[test]
    fn no_columns_yields_only_grand_total() {
        let empty: [&str; 0] = [];
        assert!(column_subsets(&empty).is_empty());
        assert_eq!(report_order(&empty), vec![Vec::<String>::new()]);
    }

    #[test]
    fn report_order_is_size_descending() {
        let order = report_order(&["A", "B", "C"]);
        assert_eq!(
            names(&order),
            ["A,B,C", "A,B", "A,C", "B,C", "A", "B", "C", ""]
        );
    }
}
