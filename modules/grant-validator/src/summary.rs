use std::collections::BTreeMap;

use grant_common::types::ValidationReport;

/// Aggregate view over a batch of [`ValidationReport`]s, for the
/// orchestrator's per-job summary and the CLI's `stats` output.
#[derive(Debug, Clone, Default)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// Most common error messages, most frequent first.
    pub top_errors: Vec<(String, usize)>,
    /// Most common warning messages, most frequent first.
    pub top_warnings: Vec<(String, usize)>,
}

const TOP_N: usize = 5;

pub fn summarize(reports: &[ValidationReport]) -> ValidationSummary {
    let mut error_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut warning_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;
    let mut valid = 0;

    for report in reports {
        if report.valid {
            valid += 1;
        }
        total_errors += report.errors.len();
        total_warnings += report.warnings.len();
        for error in &report.errors {
            *error_counts.entry(error.message.as_str()).or_insert(0) += 1;
        }
        for warning in &report.warnings {
            *warning_counts.entry(warning.message.as_str()).or_insert(0) += 1;
        }
    }

    ValidationSummary {
        total: reports.len(),
        valid,
        invalid: reports.len() - valid,
        total_errors,
        total_warnings,
        top_errors: top_n(error_counts),
        top_warnings: top_n(warning_counts),
    }
}

fn top_n(counts: BTreeMap<&str, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(TOP_N);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use grant_common::types::ValidationError;

    fn report_with_errors(messages: &[&str]) -> ValidationReport {
        ValidationReport {
            valid: messages.is_empty(),
            errors: messages
                .iter()
                .map(|m| ValidationError {
                    field: "title".to_string(),
                    message: m.to_string(),
                })
                .collect(),
            warnings: Vec::new(),
            quality_score: if messages.is_empty() { 100 } else { 50 },
        }
    }

    #[test]
    fn counts_valid_and_invalid() {
        let reports = vec![report_with_errors(&[]), report_with_errors(&["missing title"])];
        let summary = summarize(&reports);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.invalid, 1);
    }

    #[test]
    fn ranks_most_frequent_error_first() {
        let reports = vec![
            report_with_errors(&["missing title"]),
            report_with_errors(&["missing title"]),
            report_with_errors(&["missing funder name"]),
        ];
        let summary = summarize(&reports);
        assert_eq!(summary.top_errors[0], ("missing title".to_string(), 2));
    }

    #[test]
    fn empty_batch_yields_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.top_errors.is_empty());
    }
}
