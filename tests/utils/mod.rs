//! Shared fixtures: small OMOP tables written to temporary directories

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use ehr_cohort::CohortConfig;
use ehr_cohort::models::{ConditionEvent, Domain, EhrRecord, Person, Visit};
use ehr_cohort::tables::OmopTables;
use ehr_cohort::utils::arrow::naive_date_to_date32;
use parquet::arrow::ArrowWriter;

/// Heart-failure concept from the bundled vocabulary
pub const HF_CONCEPT: i64 = 316_139;
/// Inpatient visit
pub const INPATIENT: i64 = 9201;
/// Outpatient visit, not a qualifying type
pub const OUTPATIENT: i64 = 9202;
/// A diagnosis outside the heart-failure vocabulary
pub const HYPERTENSION: i64 = 320_128;

/// Parse a `YYYY-MM-DD` literal
#[must_use]
pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

/// Cohort configuration with default vocabularies and the given cutoff
#[must_use]
pub fn cohort_config(date_filter: &str) -> CohortConfig {
    CohortConfig::new(date(date_filter))
}

#[derive(Debug, Clone)]
struct EventRow {
    person_id: i64,
    visit_occurrence_id: Option<i64>,
    concept_id: i64,
    date: NaiveDate,
}

/// Builder for a set of OMOP tables
#[derive(Debug, Clone, Default)]
pub struct OmopFixture {
    persons: Vec<(i64, i32)>,
    visits: Vec<Visit>,
    conditions: Vec<EventRow>,
    drugs: Vec<EventRow>,
    procedures: Vec<EventRow>,
}

impl OmopFixture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn person(mut self, person_id: i64, year_of_birth: i32) -> Self {
        self.persons.push((person_id, year_of_birth));
        self
    }

    #[must_use]
    pub fn visit(mut self, visit_id: i64, person_id: i64, concept: i64, on: &str) -> Self {
        self.visits.push(Visit::new(visit_id, person_id, concept, date(on)));
        self
    }

    #[must_use]
    pub fn condition(
        mut self,
        person_id: i64,
        visit_id: Option<i64>,
        concept: i64,
        on: &str,
    ) -> Self {
        self.conditions.push(EventRow {
            person_id,
            visit_occurrence_id: visit_id,
            concept_id: concept,
            date: date(on),
        });
        self
    }

    #[must_use]
    pub fn drug(mut self, person_id: i64, visit_id: i64, concept: i64, on: &str) -> Self {
        self.drugs.push(EventRow {
            person_id,
            visit_occurrence_id: Some(visit_id),
            concept_id: concept,
            date: date(on),
        });
        self
    }

    #[must_use]
    pub fn procedure(mut self, person_id: i64, visit_id: i64, concept: i64, on: &str) -> Self {
        self.procedures.push(EventRow {
            person_id,
            visit_occurrence_id: Some(visit_id),
            concept_id: concept,
            date: date(on),
        });
        self
    }

    /// The decoded relations the loader would produce for these tables
    #[must_use]
    pub fn tables(&self) -> OmopTables {
        let to_records = |rows: &[EventRow], domain: Domain| -> Vec<EhrRecord> {
            rows.iter()
                .filter(|row| row.concept_id != 0)
                .filter_map(|row| {
                    Some(EhrRecord::new(
                        row.person_id,
                        row.concept_id,
                        row.date,
                        row.visit_occurrence_id?,
                        domain,
                    ))
                })
                .collect()
        };

        let mut events = to_records(&self.conditions, Domain::Condition);
        events.extend(to_records(&self.drugs, Domain::Drug));
        events.extend(to_records(&self.procedures, Domain::Procedure));

        OmopTables {
            persons: self
                .persons
                .iter()
                .map(|&(id, yob)| Person::new(id, yob))
                .collect(),
            visits: self.visits.clone(),
            conditions: self
                .conditions
                .iter()
                .map(|row| {
                    ConditionEvent::new(row.person_id, row.visit_occurrence_id, row.concept_id)
                })
                .collect(),
            events,
        }
    }

    /// Write every table under `root`, one folder per table
    pub fn write(&self, root: &Path) -> PathBuf {
        self.write_except(root, &[])
    }

    /// Write every table except those named in `skip`
    pub fn write_except(&self, root: &Path, skip: &[&str]) -> PathBuf {
        let tables = [
            ("person", self.person_batch()),
            ("visit_occurrence", self.visit_batch()),
            (
                "condition_occurrence",
                event_batch(&self.conditions, Domain::Condition),
            ),
            ("drug_exposure", event_batch(&self.drugs, Domain::Drug)),
            (
                "procedure_occurrence",
                event_batch(&self.procedures, Domain::Procedure),
            ),
        ];
        for (name, batch) in tables {
            if !skip.contains(&name) {
                write_table(root, name, &batch);
            }
        }
        root.to_path_buf()
    }

    // year_of_birth is stored as Int32 to exercise integer widening
    fn person_batch(&self) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("person_id", DataType::Int64, false),
            Field::new("year_of_birth", DataType::Int32, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from_iter_values(self.persons.iter().map(|p| p.0))),
                Arc::new(Int32Array::from_iter_values(self.persons.iter().map(|p| p.1))),
            ],
        )
        .expect("person batch")
    }

    // visit_start_date is stored as ISO strings to exercise date parsing
    fn visit_batch(&self) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("visit_occurrence_id", DataType::Int64, false),
            Field::new("person_id", DataType::Int64, false),
            Field::new("visit_concept_id", DataType::Int64, true),
            Field::new("visit_start_date", DataType::Utf8, true),
        ]);
        let dates: Vec<String> = self
            .visits
            .iter()
            .map(|v| v.visit_start_date.format("%Y-%m-%d").to_string())
            .collect();
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from_iter_values(
                    self.visits.iter().map(|v| v.visit_occurrence_id),
                )),
                Arc::new(Int64Array::from_iter_values(self.visits.iter().map(|v| v.person_id))),
                Arc::new(Int64Array::from_iter_values(
                    self.visits.iter().map(|v| v.visit_concept_id),
                )),
                Arc::new(StringArray::from_iter_values(dates)),
            ],
        )
        .expect("visit batch")
    }
}

fn event_batch(rows: &[EventRow], domain: Domain) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("person_id", DataType::Int64, false),
        Field::new("visit_occurrence_id", DataType::Int64, true),
        Field::new(domain.concept_column(), DataType::Int64, true),
        Field::new(domain.date_column(), DataType::Date32, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.person_id))),
        Arc::new(Int64Array::from_iter(
            rows.iter().map(|r| r.visit_occurrence_id),
        )),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.concept_id))),
        Arc::new(Date32Array::from_iter_values(
            rows.iter().map(|r| naive_date_to_date32(r.date)),
        )),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).expect("event batch")
}

fn write_table(root: &Path, name: &str, batch: &RecordBatch) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("table dir");
    let file = File::create(dir.join("part-00000.parquet")).expect("table file");
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("writer");
    writer.write(batch).expect("write batch");
    writer.close().expect("close writer");
}

/// The standard scenario set
///
/// * 1: case, HF inpatient visit 2020-01-01, born 1960
/// * 2: control, inpatient visits 2019-03-01 and 2020-06-01, born 1970
/// * 3: would be a control but is 85 at the index date
/// * 4: only an outpatient visit, never enters the cohort
#[must_use]
pub fn scenario() -> OmopFixture {
    OmopFixture::new()
        .person(1, 1960)
        .person(2, 1970)
        .person(3, 1935)
        .person(4, 1980)
        // patient 1
        .visit(100, 1, INPATIENT, "2020-01-01")
        .visit(101, 1, INPATIENT, "2019-09-01")
        .visit(102, 1, INPATIENT, "2019-11-01")
        .condition(1, Some(100), HF_CONCEPT, "2020-01-01")
        .condition(1, Some(101), HYPERTENSION, "2019-09-01")
        .condition(1, Some(102), HYPERTENSION, "2019-11-01")
        .drug(1, 101, 1_112_807, "2019-09-01")
        .drug(1, 100, 1_112_807, "2020-01-01")
        .procedure(1, 101, 4_230_911, "2019-09-01")
        // patient 2
        .visit(200, 2, INPATIENT, "2019-03-01")
        .visit(201, 2, INPATIENT, "2020-06-01")
        .condition(2, Some(200), HYPERTENSION, "2019-03-01")
        .drug(2, 200, 19_019_073, "2019-03-01")
        .condition(2, Some(201), HYPERTENSION, "2020-06-01")
        // patient 3
        .visit(300, 3, INPATIENT, "2020-02-01")
        .visit(301, 3, INPATIENT, "2019-01-15")
        .condition(3, Some(301), HYPERTENSION, "2019-01-15")
        // patient 4
        .visit(400, 4, OUTPATIENT, "2020-03-01")
        .condition(4, Some(400), HYPERTENSION, "2020-03-01")
}
