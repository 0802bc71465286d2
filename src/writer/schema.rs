//! Arrow layout of the persisted dataset
//!
//! ```text
//! person_id: Int64
//! events:    List<Struct{standard_concept_id: Int64, date: Date32,
//!                         visit_occurrence_id: Int64, domain: Utf8}>
//! label:     Int32
//! ```

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Date32Array, Int32Array, Int64Array, ListArray, StringArray,
    StructArray,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{
    DataType, Date32Type, Field, FieldRef, Fields, Int32Type, Int64Type, Schema, SchemaRef,
};
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};
use crate::models::{Domain, Label, SequenceEvent, SequenceRecord};
use crate::utils::arrow::{date32_to_naive_date, naive_date_to_date32};
use crate::utils::io::{find_parquet_files, read_parquet};

/// Column holding the patient identifier
pub const PERSON_ID: &str = "person_id";
/// Column holding the event list
pub const EVENTS: &str = "events";
/// Column holding the binary label
pub const LABEL: &str = "label";

const STANDARD_CONCEPT_ID: &str = "standard_concept_id";
const DATE: &str = "date";
const VISIT_OCCURRENCE_ID: &str = "visit_occurrence_id";
const DOMAIN: &str = "domain";

/// Fields of one event struct
#[must_use]
pub fn event_fields() -> Fields {
    Fields::from(vec![
        Field::new(STANDARD_CONCEPT_ID, DataType::Int64, false),
        Field::new(DATE, DataType::Date32, false),
        Field::new(VISIT_OCCURRENCE_ID, DataType::Int64, false),
        Field::new(DOMAIN, DataType::Utf8, false),
    ])
}

fn event_item_field() -> FieldRef {
    Arc::new(Field::new("item", DataType::Struct(event_fields()), false))
}

/// Schema of the persisted dataset
#[must_use]
pub fn dataset_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(PERSON_ID, DataType::Int64, false),
        Field::new(EVENTS, DataType::List(event_item_field()), false),
        Field::new(LABEL, DataType::Int32, false),
    ]))
}

/// List offsets for sequences of the given lengths
///
/// # Errors
/// Returns [`Error::InvalidDataset`] if the total event count exceeds the `i32`
/// offset range of a single batch
pub fn event_offsets(lengths: impl IntoIterator<Item = usize>) -> Result<OffsetBuffer<i32>> {
    let mut offsets = vec![0i32];
    let mut total = 0i32;
    for length in lengths {
        total = i32::try_from(length)
            .ok()
            .and_then(|length| total.checked_add(length))
            .ok_or_else(|| {
                Error::InvalidDataset("Too many events for a single record batch".to_string())
            })?;
        offsets.push(total);
    }
    Ok(OffsetBuffer::new(offsets.into()))
}

/// Encode labeled sequences as a single record batch
///
/// Large datasets should be encoded in chunks; see [`event_offsets`].
///
/// # Errors
/// Returns [`Error::InvalidDataset`] if a sequence has no label or the chunk
/// holds more events than list offsets can address, or an Arrow error if the
/// arrays cannot be assembled
pub fn sequences_to_record_batch(sequences: &[SequenceRecord]) -> Result<RecordBatch> {
    let events: Vec<&SequenceEvent> = sequences.iter().flat_map(|s| &s.events).collect();

    let concept_ids = Int64Array::from_iter_values(events.iter().map(|e| e.standard_concept_id));
    let dates =
        Date32Array::from_iter_values(events.iter().map(|e| naive_date_to_date32(e.date)));
    let visit_ids = Int64Array::from_iter_values(events.iter().map(|e| e.visit_occurrence_id));
    let domains = StringArray::from_iter_values(events.iter().map(|e| e.domain.table_name()));

    let event_structs = StructArray::try_new(
        event_fields(),
        vec![
            Arc::new(concept_ids) as ArrayRef,
            Arc::new(dates),
            Arc::new(visit_ids),
            Arc::new(domains),
        ],
        None,
    )?;
    let offsets = event_offsets(sequences.iter().map(SequenceRecord::len))?;
    let event_lists =
        ListArray::try_new(event_item_field(), offsets, Arc::new(event_structs), None)?;

    let person_ids = Int64Array::from_iter_values(sequences.iter().map(|s| s.person_id));
    let labels = sequences
        .iter()
        .map(|s| {
            s.label.map(Label::as_i32).ok_or_else(|| {
                Error::InvalidDataset(format!("Sequence of person {} has no label", s.person_id))
            })
        })
        .collect::<Result<Vec<i32>>>()?;

    Ok(RecordBatch::try_new(
        dataset_schema(),
        vec![
            Arc::new(person_ids),
            Arc::new(event_lists),
            Arc::new(Int32Array::from(labels)),
        ],
    )?)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch.column_by_name(name).ok_or_else(|| Error::ColumnNotFound {
        table: "dataset".to_string(),
        column: name.to_string(),
    })
}

fn invalid_type(column: &str, array: &dyn Array, expected: &str) -> Error {
    Error::InvalidColumnType {
        column: column.to_string(),
        data_type: array.data_type().to_string(),
        expected: expected.to_string(),
    }
}

fn int64_field<'a>(array: &'a StructArray, name: &str) -> Result<&'a Int64Array> {
    let field = array
        .column_by_name(name)
        .ok_or_else(|| Error::ColumnNotFound {
            table: EVENTS.to_string(),
            column: name.to_string(),
        })?;
    field
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| invalid_type(name, field.as_ref(), "Int64"))
}

fn decode_events(array: &StructArray) -> Result<Vec<SequenceEvent>> {
    let concept_ids = int64_field(array, STANDARD_CONCEPT_ID)?;
    let visit_ids = int64_field(array, VISIT_OCCURRENCE_ID)?;
    let dates_array = array
        .column_by_name(DATE)
        .ok_or_else(|| Error::ColumnNotFound {
            table: EVENTS.to_string(),
            column: DATE.to_string(),
        })?;
    let dates = dates_array
        .as_primitive_opt::<Date32Type>()
        .ok_or_else(|| invalid_type(DATE, dates_array.as_ref(), "Date32"))?;
    let domains_array = array
        .column_by_name(DOMAIN)
        .ok_or_else(|| Error::ColumnNotFound {
            table: EVENTS.to_string(),
            column: DOMAIN.to_string(),
        })?;
    let domains = domains_array
        .as_string_opt::<i32>()
        .ok_or_else(|| invalid_type(DOMAIN, domains_array.as_ref(), "Utf8"))?;

    (0..array.len())
        .map(|row| {
            let date = date32_to_naive_date(dates.value(row))
                .ok_or_else(|| Error::InvalidDate(dates.value(row).to_string()))?;
            Ok(SequenceEvent {
                standard_concept_id: concept_ids.value(row),
                date,
                visit_occurrence_id: visit_ids.value(row),
                domain: domains.value(row).parse::<Domain>()?,
            })
        })
        .collect()
}

/// Decode a record batch of the persisted dataset
///
/// # Errors
/// Returns an error if a column is missing, has the wrong type or a label is
/// not 0 or 1
pub fn record_batch_to_sequences(batch: &RecordBatch) -> Result<Vec<SequenceRecord>> {
    let person_array = column(batch, PERSON_ID)?;
    let person_ids = person_array
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| invalid_type(PERSON_ID, person_array.as_ref(), "Int64"))?;
    let label_array = column(batch, LABEL)?;
    let labels = label_array
        .as_primitive_opt::<Int32Type>()
        .ok_or_else(|| invalid_type(LABEL, label_array.as_ref(), "Int32"))?;
    let events_array = column(batch, EVENTS)?;
    let event_lists = events_array
        .as_list_opt::<i32>()
        .ok_or_else(|| invalid_type(EVENTS, events_array.as_ref(), "List<Struct>"))?;

    (0..batch.num_rows())
        .map(|row| {
            let values = event_lists.value(row);
            let structs = values
                .as_struct_opt()
                .ok_or_else(|| invalid_type(EVENTS, values.as_ref(), "Struct"))?;
            let label = Label::from_i32(labels.value(row)).ok_or_else(|| {
                Error::InvalidDataset(format!("Unexpected label {}", labels.value(row)))
            })?;
            Ok(SequenceRecord {
                person_id: person_ids.value(row),
                events: decode_events(structs)?,
                label: Some(label),
            })
        })
        .collect()
}

/// Read every part file of a persisted dataset
///
/// # Errors
/// Returns an error if the dataset folder is missing or a part file cannot be decoded
pub fn read_dataset(path: &Path) -> Result<Vec<SequenceRecord>> {
    let mut sequences = Vec::new();
    for file in find_parquet_files(path)? {
        for batch in read_parquet(&file, None, crate::utils::DEFAULT_BATCH_SIZE)? {
            sequences.extend(record_batch_to_sequences(&batch)?);
        }
    }
    Ok(sequences)
}
