//! Summary counts for a cohort build

use std::fmt;

/// Counts collected while building a cohort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CohortStatistics {
    /// Visits of a qualifying type
    pub qualifying_visits: usize,
    /// Qualifying visits with a heart-failure diagnosis
    pub heart_failure_visits: usize,
    /// Cases before the age filter
    pub candidate_cases: usize,
    /// Controls before the age filter
    pub candidate_controls: usize,
    /// Cases after the age filter
    pub cases: usize,
    /// Controls after the age filter
    pub controls: usize,
}

impl CohortStatistics {
    /// Records removed by the age filter
    #[must_use]
    pub const fn age_excluded(&self) -> usize {
        (self.candidate_cases + self.candidate_controls) - (self.cases + self.controls)
    }

    /// Final cohort size
    #[must_use]
    pub const fn cohort_size(&self) -> usize {
        self.cases + self.controls
    }
}

impl fmt::Display for CohortStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cohort Summary:")?;
        writeln!(f, "  Qualifying Visits: {}", self.qualifying_visits)?;
        writeln!(f, "  Heart Failure Visits: {}", self.heart_failure_visits)?;
        writeln!(f, "  Cases: {} (of {} candidates)", self.cases, self.candidate_cases)?;
        writeln!(
            f,
            "  Controls: {} (of {} candidates)",
            self.controls, self.candidate_controls
        )?;
        writeln!(f, "  Excluded By Age: {}", self.age_excluded())
    }
}
