pub mod filter;
pub mod sampler;

pub use filter::{ModeKind, SelectionMode};
