//! # Batches and Field Mapping
//!
//! A [`Batch`] is one synchronized set of named arrays. Every present array
//! shares the same length along axis 0, the record axis, and the whole batch is
//! serialized into a single container.
//!
//! The [`FieldMapping`] names the dataset each logical field is written to.

mod array;
mod mapping;
mod types;


pub(crate) use array::with_field_array;
pub use array::{Element, ElementType, FieldArray};
pub use mapping::FieldMapping;
pub use types::Batch;
