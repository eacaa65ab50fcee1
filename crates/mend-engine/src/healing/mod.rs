pub mod candidates;
pub mod controller;
pub mod proposer;

pub use controller::{HealOutcome, Healer};
