//! Plain-text rendering of the summary table.
//!
//! Produces a fixed-width table for terminal output, one row per policy.

use crate::report::SummaryRow;

const COLUMNS: [&str; 7] = [
    "makespan",
    "avg_exec",
    "avg_wait",
    "throughput",
    "imbalance",
    "resource_util",
    "runs",
];

/// Render summary rows as an aligned text table.
pub fn render_summary(rows: &[SummaryRow]) -> String {
    let policy_width = rows
        .iter()
        .map(|r| r.policy.len())
        .max()
        .unwrap_or(0)
        .max("policy".len());

    let mut out = String::new();

    out.push_str(&format!("{:<policy_width$}", "policy"));
    for col in COLUMNS {
        out.push_str(&format!("  {col:>13}"));
    }
    out.push('\n');

    for r in rows {
        out.push_str(&format!("{:<policy_width$}", r.policy));
        for value in [
            r.makespan,
            r.avg_exec,
            r.avg_wait,
            r.throughput,
            r.imbalance,
            r.resource_util,
        ] {
            match value {
                Some(v) => out.push_str(&format!("  {v:>13.4}")),
                None => out.push_str(&format!("  {:>13}", "-")),
            }
        }
        out.push_str(&format!("  {:>13}\n", r.runs));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(policy: &str, makespan: Option<f64>) -> SummaryRow {
        SummaryRow {
            policy: policy.to_string(),
            runs: if makespan.is_some() { 10 } else { 0 },
            makespan,
            avg_exec: makespan.map(|m| m / 4.0),
            avg_wait: makespan.map(|_| 0.125),
            throughput: makespan.map(|m| 8.0 / m),
            imbalance: makespan.map(|_| 0.5),
            resource_util: makespan.map(|_| 0.25),
        }
    }

    #[test]
    fn renders_header_and_rows() {
        let output = render_summary(&[row("FCFS", Some(12.5)), row("SHC", Some(8.0))]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("policy"));
        assert!(lines[0].contains("resource_util"));
        assert!(lines[1].starts_with("FCFS"));
        assert!(lines[1].contains("12.5000"));
        assert!(lines[2].contains("1.0000")); // 8 / 8.0
    }

    #[test]
    fn missing_metrics_render_as_dash() {
        let output = render_summary(&[row("RR", None)]);
        let data = output.lines().nth(1).unwrap();
        assert!(data.contains(" -"));
        assert!(data.trim_end().ends_with('0'));
    }

    #[test]
    fn columns_align_with_long_policy_names() {
        let output = render_summary(&[row("FCFS", Some(1.0)), row("hill-climbing", Some(2.0))]);
        let widths: Vec<usize> = output.lines().map(str::len).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn empty_input_renders_header_only() {
        let output = render_summary(&[]);
        assert_eq!(output.lines().count(), 1);
    }
}
