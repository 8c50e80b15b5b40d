//! Access layer: one module per entity, each translating domain operations
//! into store transactions. Every mutating operation runs inside a single
//! transaction; a dropped transaction rolls back, so no partial write is ever
//! visible on an error path.

pub mod categories;
pub mod posts;
pub mod users;

/// Message used when a partial update arrives with no fields.
pub(crate) const EMPTY_UPDATE: &str = "At least one valid field must be provided for update";
