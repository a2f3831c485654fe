//! Cohort ordering rules.
//!
//! Candidate groups are bucketed into cohorts keyed by (class year, study).
//! Cohorts are filled one after another; the order comes from a chain of
//! rules evaluated sequentially, each consulted only when the previous
//! ones tie.
//!
//! # Score Convention
//! **Lower score = filled earlier.**

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::StudyPriorities;
use crate::models::Group;

/// Score returned by a cohort rule. Lower scores are filled first.
pub type CohortScore = f64;

/// Candidate groups sharing a class year and study.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    pub classyear: u32,
    pub study: String,
    /// Groups in fill order (`groupnum` ascending).
    pub groups: Vec<Group>,
}

impl Cohort {
    pub fn new(classyear: u32, study: impl Into<String>) -> Self {
        Self {
            classyear,
            study: study.into(),
            groups: Vec::new(),
        }
    }

    /// Cohort key.
    pub fn key(&self) -> (u32, &str) {
        (self.classyear, &self.study)
    }
}

/// A rule ranking cohorts for filling.
pub trait CohortRule: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Returns a score where lower = filled earlier.
    fn evaluate(&self, cohort: &Cohort) -> CohortScore;
}

/// Study priority table rank. Unknown studies rank last.
#[derive(Debug, Clone)]
pub struct StudyRank {
    priorities: StudyPriorities,
}

impl StudyRank {
    pub fn new(priorities: StudyPriorities) -> Self {
        Self { priorities }
    }
}

impl CohortRule for StudyRank {
    fn name(&self) -> &'static str {
        "STUDY_RANK"
    }

    fn evaluate(&self, cohort: &Cohort) -> CohortScore {
        f64::from(self.priorities.rank(&cohort.study))
    }
}

/// Lower class years first.
#[derive(Debug, Clone, Copy)]
pub struct ClassYear;

impl CohortRule for ClassYear {
    fn name(&self) -> &'static str {
        "CLASSYEAR"
    }

    fn evaluate(&self, cohort: &Cohort) -> CohortScore {
        f64::from(cohort.classyear)
    }
}

/// Sequential rule chain ordering cohorts.
///
/// Cohorts that tie on every rule are ordered by their key, so the result
/// never depends on input order.
#[derive(Clone)]
pub struct CohortOrdering {
    rules: Vec<Arc<dyn CohortRule>>,
    epsilon: f64,
}

impl CohortOrdering {
    /// Creates an empty ordering (key order only).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Study rank, then class year.
    pub fn by_study_priority(priorities: StudyPriorities) -> Self {
        Self::new()
            .with_rule(StudyRank::new(priorities))
            .with_rule(ClassYear)
    }

    /// Appends a rule consulted when all earlier rules tie.
    pub fn with_rule<R: CohortRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sorts cohorts in fill order.
    pub fn sort(&self, cohorts: &mut [Cohort]) {
        cohorts.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &Cohort, b: &Cohort) -> std::cmp::Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a);
            let score_b = rule.evaluate(b);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.total_cmp(&score_b);
            }
        }

        a.key().cmp(&b.key())
    }
}

impl Default for CohortOrdering {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for CohortOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohortOrdering")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(cohorts: &[Cohort]) -> Vec<(u32, &str)> {
        cohorts.iter().map(Cohort::key).collect()
    }

    #[test]
    fn test_study_rank_then_classyear() {
        let mut cohorts = vec![
            Cohort::new(1, "BMA-KO"),
            Cohort::new(2, "BUN-RI"),
            Cohort::new(1, "BUN-RI"),
            Cohort::new(1, "BVS-RI"),
        ];
        CohortOrdering::by_study_priority(StudyPriorities::default()).sort(&mut cohorts);

        assert_eq!(
            keys(&cohorts),
            vec![(1, "BUN-RI"), (2, "BUN-RI"), (1, "BVS-RI"), (1, "BMA-KO")]
        );
    }

    #[test]
    fn test_unranked_studies_last() {
        let priorities = StudyPriorities::empty().with_rank("B", 1);
        let mut cohorts = vec![
            Cohort::new(1, "Z"),
            Cohort::new(3, "B"),
            Cohort::new(1, "A"),
        ];
        CohortOrdering::by_study_priority(priorities).sort(&mut cohorts);

        // A and Z tie on rank and class year; key order decides.
        assert_eq!(keys(&cohorts), vec![(3, "B"), (1, "A"), (1, "Z")]);
    }

    #[test]
    fn test_empty_ordering_uses_key() {
        let mut cohorts = vec![Cohort::new(2, "A"), Cohort::new(1, "B")];
        CohortOrdering::new().sort(&mut cohorts);
        assert_eq!(keys(&cohorts), vec![(1, "B"), (2, "A")]);
    }

    #[test]
    fn test_debug_lists_rules() {
        let ordering = CohortOrdering::by_study_priority(StudyPriorities::default());
        let dbg = format!("{ordering:?}");
        assert!(dbg.contains("STUDY_RANK"));
        assert!(dbg.contains("CLASSYEAR"));
    }
}
