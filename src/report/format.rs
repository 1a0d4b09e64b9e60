//! Terminal summaries for each subcommand.
//!
//! Formatting lives here so the estimators stay free of presentation code.
//! Tables are rendered with fixed-width columns and trailing whitespace
//! trimmed from every line.

use crate::domain::{Calibration, LogisticDifReport, MhReport, NormPack};
use crate::norms::OVERALL_BAND;

use super::ets_counts;

/// Discrimination values this close to a clamp bound are marked in the table.
const BOUND_TOL: f64 = 1e-9;

/// Calibration summary with one row per item.
pub fn format_calibration_summary(cal: &Calibration) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== 2PL calibration: {} ===\n", cal.domain));
    out.push_str(&format!(
        "Persons: {} | items calibrated: {}\n\n",
        cal.n_persons,
        cal.params.len()
    ));

    if cal.params.is_empty() {
        out.push_str("No item met the observation threshold.\n");
        return out;
    }

    push_row(&mut out, format!("{:<24} {:>8} {:>8}", "item", "a", "b"));
    push_row(&mut out, format!("{:-<24} {:-<8} {:-<8}", "", "", ""));
    for (id, p) in &cal.params {
        let at_bound = (p.a - crate::irt::A_MIN).abs() < BOUND_TOL
            || (p.a - crate::irt::A_MAX).abs() < BOUND_TOL
            || (p.b - crate::irt::B_MIN).abs() < BOUND_TOL
            || (p.b - crate::irt::B_MAX).abs() < BOUND_TOL;
        push_row(
            &mut out,
            format!(
                "{:<24} {:>8.3} {:>8.3} {}",
                truncate(id, 24),
                p.a,
                p.b,
                if at_bound { "(bound)" } else { "" }
            ),
        );
    }

    out
}

/// Mantel-Haenszel summary: group roles, ETS class counts, and the `top`
/// items by |delta|.
pub fn format_mh_summary(report: &MhReport, top: usize) -> String {
    let mut out = String::new();
    let counts = ets_counts(report);

    out.push_str("=== Mantel-Haenszel DIF ===\n");
    out.push_str(&format!(
        "Reference: {} | focal: {}\n",
        report.reference,
        report.focal.join(", ")
    ));
    out.push_str(&format!(
        "Items: {} | ETS A={} B={} C={}\n\n",
        report.items.len(),
        counts.a,
        counts.b,
        counts.c
    ));

    push_row(
        &mut out,
        format!(
            "{:<24} {:>10} {:>10} {:>5} {:>7} {:>7}",
            "item", "alpha", "delta", "ets", "n_ref", "n_foc"
        ),
    );
    push_row(
        &mut out,
        format!("{:-<24} {:-<10} {:-<10} {:-<5} {:-<7} {:-<7}", "", "", "", "", "", ""),
    );
    for r in report.items.iter().take(top) {
        push_row(
            &mut out,
            format!(
                "{:<24} {:>10.4} {:>10.4} {:>5} {:>7} {:>7}",
                truncate(&r.item_id, 24),
                r.alpha,
                r.delta_mh,
                r.ets_class().label(),
                r.n_reference,
                r.n_focal
            ),
        );
    }

    out
}

/// Logistic DIF summary with the `top` items by combined effect size.
pub fn format_logistic_summary(report: &LogisticDifReport, top: usize) -> String {
    let mut out = String::new();

    out.push_str("=== Logistic regression DIF ===\n");
    out.push_str(&format!(
        "Reference: {} | focal: {} | items: {}\n\n",
        report.reference,
        report.focal,
        report.items.len()
    ));

    push_row(
        &mut out,
        format!("{:<24} {:>10} {:>12} {:>6}", "item", "b_group", "b_interact", "n"),
    );
    push_row(&mut out, format!("{:-<24} {:-<10} {:-<12} {:-<6}", "", "", "", ""));
    for r in report.items.iter().take(top) {
        push_row(
            &mut out,
            format!(
                "{:<24} {:>10.4} {:>12.4} {:>6}",
                truncate(&r.item_id, 24),
                r.b_group,
                r.b_interaction,
                r.n
            ),
        );
    }

    out
}

/// Norm pack summary. Band means are also shown on the IQ scale.
pub fn format_norm_summary(pack: &NormPack) -> String {
    let mut out = String::new();
    let t = &pack.theta_to_iq;

    out.push_str(&format!("=== Norm pack {} ===\n", pack.version));
    out.push_str(&format!("Created: {}\n", pack.created_at));
    out.push_str(&format!(
        "Theta: mean={:.4} sd={:.4} -> IQ mean={} sd={}\n\n",
        t.theta_mean, t.theta_sd, t.mean, t.sd
    ));

    push_row(
        &mut out,
        format!("{:<16} {:>6} {:>10} {:>10} {:>8}", "band", "n", "theta", "sd", "iq"),
    );
    push_row(&mut out, format!("{:-<16} {:-<6} {:-<10} {:-<10} {:-<8}", "", "", "", "", ""));
    for band in &pack.age_bands {
        let label = if band.id == OVERALL_BAND { "(overall)" } else { band.id.as_str() };
        push_row(
            &mut out,
            format!(
                "{:<16} {:>6} {:>10.4} {:>10.4} {:>8.1}",
                truncate(label, 16),
                band.n,
                band.theta_mean,
                band.theta_sd,
                pack.theta_to_iq(band.theta_mean)
            ),
        );
    }

    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
