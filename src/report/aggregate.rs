use time::OffsetDateTime;

use crate::core::{ReportSummary, TestOutcome, TestReport, TestStatus};

/// Folds outcome records into summary counts. The timestamp is the time of
/// generation, not of any individual test.
pub fn aggregate(records: &[TestOutcome], generated_at: OffsetDateTime) -> ReportSummary {
    let passed = records
        .iter()
        .filter(|r| r.status == TestStatus::Passed)
        .count();
    let failed = records
        .iter()
        .filter(|r| r.status == TestStatus::Failed)
        .count();
    let duration = records
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.duration_ms()));

    ReportSummary {
        total: records.len(),
        passed,
        failed,
        duration,
        timestamp: super::format_timestamp(generated_at),
    }
}

impl TestReport {
    pub fn generate(details: Vec<TestOutcome>, generated_at: OffsetDateTime) -> Self {
        Self {
            summary: aggregate(&details, generated_at),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const AT: OffsetDateTime = datetime!(2026-01-01 00:00:00 UTC);

    fn outcome(status: TestStatus, duration: Option<u64>) -> TestOutcome {
        TestOutcome {
            title: "t".to_string(),
            status,
            duration,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            error: None,
            screenshot: None,
        }
    }

    #[test]
    fn empty_input_yields_zeros() {
        let s = aggregate(&[], AT);
        assert_eq!((s.total, s.passed, s.failed, s.duration), (0, 0, 0, 0));
        assert_eq!(s.timestamp, "2026-01-01T00:00:00Z");
    }

    #[test]
    fn missing_durations_count_as_zero() {
        let records = vec![
            outcome(TestStatus::Passed, Some(100)),
            outcome(TestStatus::Failed, Some(200)),
            outcome(TestStatus::Passed, None),
        ];
        let s = aggregate(&records, AT);
        assert_eq!(s.duration, 300);
        assert_eq!((s.total, s.passed, s.failed), (3, 2, 1));
    }

    #[test]
    fn order_does_not_matter() {
        let mut records: Vec<TestOutcome> = (0..2000u64)
            .map(|i| {
                let status = if i % 3 == 0 {
                    TestStatus::Failed
                } else {
                    TestStatus::Passed
                };
                outcome(status, if i % 7 == 0 { None } else { Some(i) })
            })
            .collect();
        let forward = aggregate(&records, AT);
        records.reverse();
        let backward = aggregate(&records, AT);
        assert_eq!(forward, backward);
        assert_eq!(forward.total, 2000);
        assert_eq!(forward.failed, 667);
        assert_eq!(forward.passed + forward.failed, forward.total);
    }

    #[test]
    fn generate_keeps_details_untouched() {
        let details = vec![outcome(TestStatus::Passed, Some(5))];
        let report = TestReport::generate(details.clone(), AT);
        assert_eq!(report.details, details);
        assert_eq!(report.summary.total, 1);
    }
}
