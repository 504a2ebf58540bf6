pub mod triple_barrier;
pub mod types;

pub use triple_barrier::{LabelStats, TripleBarrierLabeler};
pub use types::{ExitReason, Label, LabeledRecord};
