//! Age eligibility filter

use rustc_hash::FxHashMap;

use crate::models::{CohortRecord, Person, PersonId};

/// Keep cohort records whose age at the index date lies in `[lower, upper]`
///
/// Age is the index year minus the year of birth. Records for patients absent
/// from `persons`, or whose age is not representable, are dropped like any
/// other ineligible record. When a patient
/// appears more than once in `persons`, the first row wins.
#[must_use]
pub fn apply_age_filter(
    records: &[CohortRecord],
    persons: &[Person],
    lower: i32,
    upper: i32,
) -> Vec<CohortRecord> {
    let mut by_id: FxHashMap<PersonId, &Person> = FxHashMap::default();
    for person in persons {
        by_id.entry(person.person_id).or_insert(person);
    }

    let eligible: Vec<CohortRecord> = records
        .iter()
        .filter_map(|record| {
            let person = by_id.get(&record.person_id)?;
            let age = person.age_at(record.index_date)?;
            (lower..=upper)
                .contains(&age)
                .then(|| record.with_age(age))
        })
        .collect();

    log::debug!(
        "Age filter [{lower}, {upper}] kept {} of {} cohort records",
        eligible.len(),
        records.len()
    );
    eligible
}
