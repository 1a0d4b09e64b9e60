//! Reporting utilities: DIF flag counts and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{EtsClass, MhReport};

/// Number of Mantel-Haenszel items in each ETS class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EtsCounts {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl EtsCounts {
    pub fn flagged(&self) -> usize {
        self.b + self.c
    }
}

/// Count items per ETS class.
pub fn ets_counts(report: &MhReport) -> EtsCounts {
    report
        .items
        .iter()
        .fold(EtsCounts::default(), |mut acc, item| {
            match item.ets_class() {
                EtsClass::A => acc.a += 1,
                EtsClass::B => acc.b += 1,
                EtsClass::C => acc.c += 1,
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MhItemResult;

    #[test]
    fn counts_by_class() {
        let item = |id: &str, delta: f64| MhItemResult {
            item_id: id.into(),
            alpha: (delta / -2.35).exp(),
            delta_mh: delta,
            n_reference: 50,
            n_focal: 50,
        };
        let report = MhReport {
            reference: "en".into(),
            focal: vec!["es".into()],
            items: vec![item("q1", 2.0), item("q2", -1.2), item("q3", 0.1), item("q4", -0.4)],
        };
        let counts = ets_counts(&report);
        assert_eq!(counts, EtsCounts { a: 2, b: 1, c: 1 });
        assert_eq!(counts.flagged(), 2);
    }
}
