pub mod comparison;
pub mod simulator;
