//! Temporal event selection
//!
//! An event is usable for a patient only if it is dated at least the buffer
//! period before the index date and does not belong to the index visit.
//! [`SelectedEvent`] can only be produced by [`IndexWindow::admit`], so every
//! selected event has passed both checks.

use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::models::{CohortRecord, EhrRecord, PersonId, SequenceEvent, VisitId};

/// The admissible history of one cohort member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexWindow {
    person_id: PersonId,
    index_visit_id: VisitId,
    cutoff: NaiveDate,
    history_start: Option<NaiveDate>,
}

impl IndexWindow {
    /// Window for `record`: events up to `index_date - buffer_period_days`
    ///
    /// `history_start`, when set, additionally drops events dated before it.
    /// Returns `None` if the cutoff falls before the earliest representable date.
    #[must_use]
    pub fn for_record(
        record: &CohortRecord,
        buffer_period_days: u32,
        history_start: Option<NaiveDate>,
    ) -> Option<Self> {
        let cutoff = record
            .index_date
            .checked_sub_days(Days::new(u64::from(buffer_period_days)))?;
        Some(Self {
            person_id: record.person_id,
            index_visit_id: record.visit_occurrence_id,
            cutoff,
            history_start,
        })
    }

    /// Latest admissible event date
    #[must_use]
    pub const fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }

    /// Whether `event` may appear in this patient's sequence
    #[must_use]
    pub fn admits(&self, event: &EhrRecord) -> bool {
        event.person_id == self.person_id
            && event.date <= self.cutoff
            && event.visit_occurrence_id != self.index_visit_id
            && self.history_start.is_none_or(|start| event.date >= start)
    }

    /// Convert `event` into a [`SelectedEvent`] if the window admits it
    #[must_use]
    pub fn admit(&self, event: &EhrRecord) -> Option<SelectedEvent> {
        self.admits(event).then(|| SelectedEvent {
            person_id: event.person_id,
            event: SequenceEvent::from(event),
        })
    }
}

/// An event that passed its patient's [`IndexWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedEvent {
    person_id: PersonId,
    event: SequenceEvent,
}

impl SelectedEvent {
    /// Patient the event belongs to
    #[must_use]
    pub const fn person_id(&self) -> PersonId {
        self.person_id
    }

    /// Consume into the event
    #[must_use]
    pub const fn into_event(self) -> SequenceEvent {
        self.event
    }
}

/// Selects the admissible events of every cohort member
#[derive(Debug, Clone, Default)]
pub struct TemporalSelector {
    windows: FxHashMap<PersonId, IndexWindow>,
}

impl TemporalSelector {
    /// Build one window per cohort record
    #[must_use]
    pub fn new(
        cohort: &[CohortRecord],
        buffer_period_days: u32,
        history_start: Option<NaiveDate>,
    ) -> Self {
        let windows = cohort
            .iter()
            .filter_map(|record| IndexWindow::for_record(record, buffer_period_days, history_start))
            .map(|window| (window.person_id, window))
            .collect();
        Self { windows }
    }

    /// Number of patients with a window
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no patient has a window
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Admissible events, in input order
    ///
    /// Events of patients outside the cohort are dropped.
    #[must_use]
    pub fn select(&self, events: &[EhrRecord]) -> Vec<SelectedEvent> {
        let selected: Vec<SelectedEvent> = events
            .par_iter()
            .filter_map(|event| self.windows.get(&event.person_id)?.admit(event))
            .collect();

        log::debug!(
            "Selected {} of {} events for {} cohort members",
            selected.len(),
            events.len(),
            self.windows.len()
        );
        selected
    }
}
