// models/src/lib.rs
//! Domain types shared by the hospital workspace: entities, wire payloads and
//! the stateless validation rules that turn one into the other.

pub mod errors;
pub mod medical;
pub mod validation;

pub use errors::{FieldError, ValidationError, ValidationErrors, ValidationResult};
