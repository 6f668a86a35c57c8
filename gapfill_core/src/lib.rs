// gapfill_core/src/lib.rs

pub mod fill;
pub mod report;
pub mod search;
pub mod series;
pub mod settings;
pub mod stats;
