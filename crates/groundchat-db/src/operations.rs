//! Database operations, grouped by table.

pub mod chunks;
pub mod documents;
