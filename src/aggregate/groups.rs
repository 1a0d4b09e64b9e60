//! Grouping-attribute resolution and DIF rows.

use std::collections::BTreeMap;

use crate::domain::Run;

/// Runs that carry the grouping attribute, with their labels.
#[derive(Debug, Clone)]
pub struct GroupedRuns<'a> {
    pub runs: Vec<(&'a Run, String)>,
    /// `(label, run count)` in first-seen corpus order.
    pub counts: Vec<(String, usize)>,
}

impl GroupedRuns<'_> {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Distinct labels in first-seen order.
    pub fn labels(&self) -> Vec<&str> {
        self.counts.iter().map(|(l, _)| l.as_str()).collect()
    }

    /// Label with the most runs. Ties go to the label seen first.
    pub fn largest_group(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(l, _)| l.as_str())
    }
}

/// Keep runs that carry `path` and record their labels.
pub fn group_runs<'a>(runs: &'a [Run], path: &str) -> GroupedRuns<'a> {
    let mut grouped = Vec::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for run in runs {
        let Some(label) = run.label(path) else {
            continue;
        };
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label.clone(), 1)),
        }
        grouped.push((run, label));
    }

    GroupedRuns {
        runs: grouped,
        counts,
    }
}

/// One scored response prepared for DIF analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifRow {
    pub domain: Option<String>,
    /// Correct responses in this run for the row's domain. The same value is
    /// shared by every row of the run in that domain.
    pub score: u32,
    pub focal: bool,
    pub outcome: u8,
}

/// Build per-item DIF rows. Every label other than `reference` is focal.
pub fn dif_rows(
    grouped: &GroupedRuns<'_>,
    reference: &str,
    domain_filter: Option<&str>,
) -> BTreeMap<String, Vec<DifRow>> {
    let mut items: BTreeMap<String, Vec<DifRow>> = BTreeMap::new();

    for (run, label) in &grouped.runs {
        let focal = label != reference;

        let mut scores: BTreeMap<Option<&str>, u32> = BTreeMap::new();
        for event in &run.log {
            if event.correct.is_correct() {
                *scores.entry(event.domain.as_deref()).or_default() += 1;
            }
        }

        for event in &run.log {
            let Some(outcome) = event.correct.as_binary() else {
                continue;
            };
            let domain = event.domain.as_deref();
            if let Some(wanted) = domain_filter {
                if domain != Some(wanted) {
                    continue;
                }
            }
            items.entry(event.item_id.clone()).or_default().push(DifRow {
                domain: event.domain.clone(),
                score: scores.get(&domain).copied().unwrap_or(0),
                focal,
                outcome,
            });
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn runs() -> Vec<Run> {
        vec![
            json!({"g": "x", "log": [
                {"itemId": "q1", "domain": "math", "correct": true},
                {"itemId": "q2", "domain": "math", "correct": true},
                {"itemId": "v1", "domain": "verbal", "correct": false}
            ]}),
            json!({"g": "y", "log": [
                {"itemId": "q1", "domain": "math", "correct": false},
                {"itemId": "q2", "domain": "math", "correct": null}
            ]}),
            json!({"log": [{"itemId": "q1", "domain": "math", "correct": true}]}),
            json!({"g": "y", "log": []}),
        ]
        .into_iter()
        .filter_map(Run::from_value)
        .collect()
    }

    #[test]
    fn runs_without_label_are_dropped() {
        let runs = runs();
        let grouped = group_runs(&runs, "g");
        assert_eq!(grouped.runs.len(), 3);
        assert_eq!(grouped.counts, vec![("x".to_string(), 1), ("y".to_string(), 2)]);
        assert_eq!(grouped.largest_group(), Some("y"));
    }

    #[test]
    fn largest_group_ties_go_to_first_seen() {
        let runs: Vec<Run> = ["b", "a", "a", "b"]
            .iter()
            .filter_map(|g| Run::from_value(json!({"g": g})))
            .collect();
        let grouped = group_runs(&runs, "g");
        assert_eq!(grouped.largest_group(), Some("b"));
    }

    #[test]
    fn rows_carry_run_level_domain_score() {
        let runs = runs();
        let grouped = group_runs(&runs, "g");
        let items = dif_rows(&grouped, "y", None);

        let q1 = &items["q1"];
        assert_eq!(q1.len(), 2);
        assert_eq!(q1[0].score, 2);
        assert!(q1[0].focal);
        assert_eq!(q1[0].outcome, 1);
        assert_eq!(q1[1].score, 0);
        assert!(!q1[1].focal);

        // Unscored q2 response from the second run is skipped.
        assert_eq!(items["q2"].len(), 1);
        assert_eq!(items["q2"][0].score, 2);
        assert_eq!(items["v1"][0].score, 0);
    }

    #[test]
    fn domain_filter_limits_rows() {
        let runs = runs();
        let grouped = group_runs(&runs, "g");
        let items = dif_rows(&grouped, "y", Some("verbal"));
        assert_eq!(items.keys().collect::<Vec<_>>(), vec!["v1"]);
    }
}
