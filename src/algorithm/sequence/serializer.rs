//! Per-patient sequence assembly

use itertools::Itertools;
use rayon::prelude::*;

use crate::algorithm::sequence::selector::SelectedEvent;
use crate::models::{SequenceEvent, SequenceRecord};

/// Group selected events by patient and order each group chronologically
///
/// Events sharing a date are ordered by domain, concept id and visit id, which
/// makes the sequence independent of input row order. Records are returned
/// sorted by `person_id` and carry no label yet.
#[must_use]
pub fn serialize_sequences(selected: Vec<SelectedEvent>) -> Vec<SequenceRecord> {
    let mut records: Vec<SequenceRecord> = selected
        .into_iter()
        .into_group_map_by(SelectedEvent::person_id)
        .into_iter()
        .map(|(person_id, events)| SequenceRecord {
            person_id,
            events: events.into_iter().map(SelectedEvent::into_event).collect(),
            label: None,
        })
        .collect();

    records.par_iter_mut().for_each(|record| {
        record.events.sort_by_key(SequenceEvent::sort_key);
    });
    records.sort_by_key(|record| record.person_id);

    log::debug!("Serialized sequences for {} patients", records.len());
    records
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::algorithm::sequence::TemporalSelector;
    use crate::models::{CohortRecord, Domain, EhrRecord, Label};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sequences_are_chronological_with_domain_tie_break() {
        let cohort = vec![
            CohortRecord::new(2, 200, date(2021, 1, 1), Label::Control),
            CohortRecord::new(1, 100, date(2021, 1, 1), Label::Case),
        ];
        let events = vec![
            EhrRecord::new(1, 30, date(2019, 6, 1), 1, Domain::Procedure),
            EhrRecord::new(1, 20, date(2019, 6, 1), 1, Domain::Drug),
            EhrRecord::new(1, 40, date(2019, 6, 1), 1, Domain::Condition),
            EhrRecord::new(1, 10, date(2018, 6, 1), 2, Domain::Condition),
            EhrRecord::new(2, 50, date(2019, 1, 1), 3, Domain::Condition),
        ];
        let selected = TemporalSelector::new(&cohort, 90, None).select(&events);
        let sequences = serialize_sequences(selected);

        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].person_id, 1);
        assert_eq!(
            sequences[0]
                .events
                .iter()
                .map(|e| (e.standard_concept_id, e.domain))
                .collect::<Vec<_>>(),
            vec![
                (10, Domain::Condition),
                (40, Domain::Condition),
                (20, Domain::Drug),
                (30, Domain::Procedure),
            ]
        );
        let drugs: Vec<_> = sequences[0]
            .events_in(Domain::Drug)
            .map(|e| e.standard_concept_id)
            .collect();
        assert_eq!(drugs, vec![20]);
        assert_eq!(sequences[0].events_in(Domain::Procedure).count(), 1);
        assert_eq!(sequences[1].person_id, 2);
        assert!(sequences.iter().all(|s| s.label.is_none()));
    }

    #[test]
    fn test_order_does_not_depend_on_input_order() {
        let cohort = vec![CohortRecord::new(1, 100, date(2021, 1, 1), Label::Case)];
        let mut events = vec![
            EhrRecord::new(1, 7, date(2019, 6, 1), 2, Domain::Drug),
            EhrRecord::new(1, 7, date(2019, 6, 1), 1, Domain::Drug),
            EhrRecord::new(1, 3, date(2019, 6, 1), 3, Domain::Drug),
        ];
        let selector = TemporalSelector::new(&cohort, 90, None);
        let forward = serialize_sequences(selector.select(&events));
        events.reverse();
        let backward = serialize_sequences(selector.select(&events));
        assert_eq!(forward, backward);
    }
}
