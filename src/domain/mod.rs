//! Domain model: entities, validation and domain errors.

pub mod entities;
pub mod error;
pub mod posts;
