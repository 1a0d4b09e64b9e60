//! Differential item functioning between two groups.
//!
//! Two independent methods share the same row aggregation:
//!
//! - `mantel_haenszel`: stratified 2x2 tables, common odds ratio and ETS delta
//! - `logistic`: per-item logistic regression with group and score x group terms
//!
//! Both skip items with fewer than `MIN_ITEM_ROWS` scored rows.

pub mod logistic;
pub mod mantel_haenszel;

pub use logistic::*;
pub use mantel_haenszel::*;

/// Scored rows an item needs before either method reports it.
pub const MIN_ITEM_ROWS: usize = 80;

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic corpora shared by the DIF tests.

    use crate::domain::Run;
    use serde_json::json;

    pub fn run(group: &str, items: &[(&str, bool)]) -> Run {
        let log: Vec<_> = items
            .iter()
            .map(|(id, c)| json!({"itemId": id, "domain": "math", "correct": c}))
            .collect();
        Run::from_value(json!({"demographics": {"group": group}, "log": log})).unwrap()
    }

    /// All 16 response patterns over `q1..q4`.
    fn patterns() -> Vec<[bool; 4]> {
        (0..16u8)
            .map(|m| [m & 1 != 0, m & 2 != 0, m & 4 != 0, m & 8 != 0])
            .collect()
    }

    fn pattern_run(group: &str, p: [bool; 4]) -> Run {
        run(
            group,
            &[("q1", p[0]), ("q2", p[1]), ("q3", p[2]), ("q4", p[3])],
        )
    }

    /// `reference_copies` and `focal_copies` of every pattern. When `biased`,
    /// focal patterns with q1 right and q2 wrong are swapped, so q1 is harder
    /// and q2 easier for the focal group at the same total score.
    pub fn swap_corpus(
        reference: &str,
        focal: &str,
        reference_copies: usize,
        focal_copies: usize,
        biased: bool,
    ) -> Vec<Run> {
        let mut runs = Vec::new();
        for p in patterns() {
            for _ in 0..reference_copies {
                runs.push(pattern_run(reference, p));
            }
            let fp = if biased && p[0] && !p[1] {
                [false, true, p[2], p[3]]
            } else {
                p
            };
            for _ in 0..focal_copies {
                runs.push(pattern_run(focal, fp));
            }
        }
        runs
    }

    /// `n` runs alternating groups `x`/`y`, each answering `edge` and `fill`
    /// with exactly one of them correct.
    pub fn edge_corpus(n: usize) -> Vec<Run> {
        (0..n)
            .map(|i| match i % 4 {
                0 => run("x", &[("edge", true), ("fill", false)]),
                1 => run("y", &[("edge", false), ("fill", true)]),
                2 => run("x", &[("edge", false), ("fill", true)]),
                _ => run("y", &[("edge", true), ("fill", false)]),
            })
            .collect()
    }
}
