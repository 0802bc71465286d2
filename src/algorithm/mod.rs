//! Algorithm implementations for cohort labeling and sequence construction
//!
//! [`cohort`] turns raw visits and diagnoses into one labeled index visit per
//! patient; [`sequence`] gathers each cohort member's prior history without
//! leaking information from the index visit or the buffer window before it.

pub mod cohort;
pub mod sequence;
