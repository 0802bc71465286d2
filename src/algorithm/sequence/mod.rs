//! Sequence construction
//!
//! [`selector`] keeps the events a model may see for each cohort member and
//! [`serializer`] orders them into one sequence per patient.

pub mod selector;
pub mod serializer;

pub use selector::{IndexWindow, SelectedEvent, TemporalSelector};
pub use serializer::serialize_sequences;
