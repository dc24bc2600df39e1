pub mod comparison;
pub mod export;
pub mod policy;
pub mod scenarios;
pub mod schedule;
pub mod series;
pub mod summary;
