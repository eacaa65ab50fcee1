pub mod engine;
pub mod result;
pub mod strategy;

pub use engine::StrategyResolver;
pub use result::ResolveError;
pub use strategy::Strategy;
