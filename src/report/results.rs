use serde::Deserialize;
use time::OffsetDateTime;

use crate::core::{TestOutcome, TestReport};
use crate::storage::{self, KeyValueStore, TEST_RESULTS_KEY};

#[derive(Debug, Deserialize)]
struct StoredResults {
    #[serde(default)]
    details: Vec<TestOutcome>,
}

/// The latest test run, kept under `testResults` as a full report that is
/// rewritten each time a record arrives.
#[derive(Debug)]
pub struct ResultsStore<S> {
    kv: S,
    details: Vec<TestOutcome>,
}

impl<S: KeyValueStore> ResultsStore<S> {
    pub fn restore(kv: S) -> Self {
        let details = storage::load_json::<StoredResults, _>(&kv, TEST_RESULTS_KEY)
            .map(|r| r.details)
            .unwrap_or_default();
        Self { kv, details }
    }

    pub fn details(&self) -> &[TestOutcome] {
        &self.details
    }

    pub fn report(&self, generated_at: OffsetDateTime) -> TestReport {
        TestReport::generate(self.details.clone(), generated_at)
    }

    pub fn record(&mut self, outcome: TestOutcome, generated_at: OffsetDateTime) {
        self.details.push(outcome);
        self.persist(generated_at);
    }

    pub fn extend(
        &mut self,
        outcomes: impl IntoIterator<Item = TestOutcome>,
        generated_at: OffsetDateTime,
    ) -> usize {
        let before = self.details.len();
        self.details.extend(outcomes);
        let added = self.details.len() - before;
        if added > 0 {
            self.persist(generated_at);
        }
        added
    }

    pub fn clear(&mut self) {
        self.details.clear();
        storage::remove_key(&self.kv, TEST_RESULTS_KEY);
    }

    fn persist(&self, generated_at: OffsetDateTime) {
        let report = self.report(generated_at);
        storage::store_json(&self.kv, TEST_RESULTS_KEY, &report);
    }
}

/// Synthetic run used to demo the report pipeline without a harness.
pub fn sample_outcomes(at: OffsetDateTime) -> Vec<TestOutcome> {
    let ts = super::format_timestamp(at);
    vec![
        TestOutcome::passed("Add Todo Item", 1200, ts.clone()),
        TestOutcome::passed("Complete Todo", 800, ts.clone()),
        TestOutcome::failed("Delete Todo Item", 1500, ts.clone(), "Delete button not found"),
        TestOutcome::passed("Filter Active Todos", 600, ts),
    ]
}
