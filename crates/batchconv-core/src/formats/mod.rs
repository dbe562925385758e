//! Input and output format routing.

pub mod registry;
