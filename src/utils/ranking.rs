//! Partitioned competition ranking
//!
//! Every "top N per group" and "rank all" output goes through here.
//! Scores are ordered descending; equal scores in a partition share a rank
//! and the next distinct score gets `1 + number of strictly higher scores`
//! (SQL `RANK()`, so 1, 1, 3).
//!
//! The optional tie-break orders rows that share a score. It never changes a
//! rank number. Without one, tied rows keep their input order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Comparator used to order rows with equal scores (ascending)
pub type TieBreak<'a, T> = Option<&'a dyn Fn(&T, &T) -> Ordering>;

/// Which ranked rows to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Keep every row
    All,
    /// Keep rows with `rank <= k`; ties at the boundary are all kept
    TopRank(usize),
    /// Keep the first `n` rows of each partition after ordering (SQL `LIMIT`)
    First(usize),
}

/// A row with its rank inside its partition
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: usize,
    pub item: T,
}

/// Rank rows inside partitions
///
/// Output is grouped by partition key (ascending), then ordered by score
/// descending and tie-break ascending.
pub fn rank_partitioned<T, K, FP, FS>(
    items: Vec<T>,
    partition: FP,
    score: FS,
    tie_break: TieBreak<'_, T>,
    selection: Selection,
) -> Vec<Ranked<T>>
where
    K: Ord,
    FP: Fn(&T) -> K,
    FS: Fn(&T) -> f64,
{
    let mut partitions: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        partitions.entry(partition(&item)).or_default().push(item);
    }

    let mut ranked = Vec::new();
    for (_, rows) in partitions {
        ranked.extend(rank_one_partition(rows, &score, tie_break, selection));
    }
    ranked
}

/// Rank all rows as a single partition
pub fn rank_global<T, FS>(
    items: Vec<T>,
    score: FS,
    tie_break: TieBreak<'_, T>,
    selection: Selection,
) -> Vec<Ranked<T>>
where
    FS: Fn(&T) -> f64,
{
    rank_one_partition(items, &score, tie_break, selection)
}

fn rank_one_partition<T, FS>(
    items: Vec<T>,
    score: &FS,
    tie_break: TieBreak<'_, T>,
    selection: Selection,
) -> Vec<Ranked<T>>
where
    FS: Fn(&T) -> f64,
{
    let mut scored: Vec<(f64, T)> = items.into_iter().map(|item| (score(&item), item)).collect();

    // Stable sort: rows equal on score and tie-break keep input order
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b.total_cmp(score_a).then_with(|| match tie_break {
            Some(cmp) => cmp(a, b),
            None => Ordering::Equal,
        })
    });

    let mut ranked = Vec::with_capacity(scored.len());
    let mut current_rank = 0;
    let mut previous: Option<f64> = None;

    for (position, (value, item)) in scored.into_iter().enumerate() {
        let tied = previous.map_or(false, |p| p.total_cmp(&value) == Ordering::Equal);
        if !tied {
            current_rank = position + 1;
            previous = Some(value);
        }

        match selection {
            Selection::All => {}
            Selection::TopRank(k) if current_rank > k => break,
            Selection::First(n) if position >= n => break,
            _ => {}
        }

        ranked.push(Ranked {
            rank: current_rank,
            item,
        });
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        group: &'static str,
        name: &'static str,
        score: f64,
    }

    fn row(group: &'static str, name: &'static str, score: f64) -> Row {
        Row { group, name, score }
    }

    fn by_name(a: &Row, b: &Row) -> Ordering {
        a.name.cmp(b.name)
    }

    #[test]
    fn test_competition_rank_with_ties() {
        let rows = vec![row("g", "c", 5.0), row("g", "a", 9.0), row("g", "b", 9.0), row("g", "d", 1.0)];
        let ranked = rank_global(rows, |r| r.score, Some(&by_name), Selection::All);

        let ranks: Vec<(usize, &str)> = ranked.iter().map(|r| (r.rank, r.item.name)).collect();
        assert_eq!(ranks, vec![(1, "a"), (1, "b"), (3, "c"), (4, "d")]);
    }

    #[test]
    fn test_top_one_keeps_exact_ties() {
        let rows = vec![
            row("x", "lab", 4.0),
            row("x", "pug", 4.0),
            row("x", "boxer", 2.0),
            row("y", "beagle", 7.0),
        ];
        let ranked = rank_partitioned(rows, |r| r.group, |r| r.score, Some(&by_name), Selection::TopRank(1));

        let names: Vec<&str> = ranked.iter().map(|r| r.item.name).collect();
        assert_eq!(names, vec!["lab", "pug", "beagle"]);
        assert!(ranked.iter().all(|r| r.rank == 1));
    }

    #[test]
    fn test_top_k_per_partition() {
        let rows = vec![
            row("x", "a", 5.0),
            row("x", "b", 4.0),
            row("x", "c", 3.0),
            row("y", "d", 1.0),
        ];
        let ranked = rank_partitioned(rows, |r| r.group, |r| r.score, Some(&by_name), Selection::TopRank(2));

        let names: Vec<&str> = ranked.iter().map(|r| r.item.name).collect();
        assert_eq!(names, vec!["a", "b", "d"]);
    }

    #[test]
    fn test_first_n_cuts_through_ties() {
        let rows = vec![row("g", "a", 1.0), row("g", "b", 1.0), row("g", "c", 1.0)];
        let ranked = rank_global(rows, |r| r.score, Some(&by_name), Selection::First(2));

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[1].item.name, "b");
        assert_eq!(ranked[1].rank, 1);
    }

    #[test]
    fn test_tie_break_does_not_change_rank() {
        let rows = vec![row("g", "z", 3.0), row("g", "a", 3.0)];
        let with = rank_global(rows.clone(), |r| r.score, Some(&by_name), Selection::All);
        let without = rank_global(rows, |r| r.score, None, Selection::All);

        assert_eq!(with[0].item.name, "a");
        assert_eq!(without[0].item.name, "z");
        assert!(with.iter().chain(without.iter()).all(|r| r.rank == 1));
    }

    #[test]
    fn test_empty_input() {
        let ranked = rank_global(Vec::<Row>::new(), |r| r.score, None, Selection::All);
        assert!(ranked.is_empty());
    }

    proptest! {
        #[test]
        fn ranks_follow_competition_semantics(
            scores in prop::collection::vec(0u8..6, 0..40)
        ) {
            let ranked = rank_global(scores.clone(), |s| *s as f64, None, Selection::All);

            for r in &ranked {
                let strictly_higher = scores.iter().filter(|s| **s > r.item).count();
                prop_assert_eq!(r.rank, strictly_higher + 1);
            }
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].item >= pair[1].item);
            }
        }
    }
}
