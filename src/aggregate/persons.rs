//! Person records and calibration observations.

use std::collections::BTreeMap;

use crate::domain::Run;
use crate::stats::AbilityStandardizer;

/// A person needs at least this many scored responses in the target domain to
/// take part in calibration.
pub const MIN_SCORED_RESPONSES: usize = 8;

/// One run reduced to the target domain.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    /// Number of correct responses in the domain.
    pub score: u32,
    /// Scored `(item_id, outcome)` pairs in log order.
    pub responses: Vec<(String, u8)>,
}

impl PersonRecord {
    pub fn from_run(run: &Run, domain: &str) -> Self {
        let mut score = 0;
        let mut responses = Vec::new();
        for event in run.log.iter().filter(|e| e.in_domain(domain)) {
            if event.correct.is_correct() {
                score += 1;
            }
            if let Some(u) = event.correct.as_binary() {
                responses.push((event.item_id.clone(), u));
            }
        }
        Self { score, responses }
    }
}

/// Persons that qualify for calibration in `domain`.
pub fn person_records(runs: &[Run], domain: &str) -> Vec<PersonRecord> {
    runs.iter()
        .map(|run| PersonRecord::from_run(run, domain))
        .filter(|p| p.responses.len() >= MIN_SCORED_RESPONSES)
        .collect()
}

/// Per-item `(theta, outcome)` observations for a set of persons.
#[derive(Debug, Clone)]
pub struct CalibrationData {
    pub n_persons: usize,
    pub standardizer: AbilityStandardizer,
    pub items: BTreeMap<String, Vec<(f64, u8)>>,
}

/// Standardize person scores and regroup their responses by item.
pub fn calibration_data(persons: &[PersonRecord]) -> CalibrationData {
    let scores: Vec<u32> = persons.iter().map(|p| p.score).collect();
    let standardizer = AbilityStandardizer::fit(&scores);

    let mut items: BTreeMap<String, Vec<(f64, u8)>> = BTreeMap::new();
    for person in persons {
        let theta = standardizer.theta(person.score);
        for (item_id, u) in &person.responses {
            items.entry(item_id.clone()).or_default().push((theta, *u));
        }
    }

    CalibrationData {
        n_persons: persons.len(),
        standardizer,
        items,
    }
}
