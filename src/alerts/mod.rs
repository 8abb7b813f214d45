//! Alert bookkeeping: the registry of live alerts, the bounded trigger
//! history, and the pure evaluation rules the scheduler applies each pass.

pub mod evaluator;
pub mod history;
pub mod registry;

pub use evaluator::{apply_edge, compose_message, evaluate, Observation};
pub use history::AlertHistory;
pub use registry::AlertRegistry;
