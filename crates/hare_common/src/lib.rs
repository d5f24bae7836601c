//! Small helpers shared across the hare crates

pub mod nom_helpers;
