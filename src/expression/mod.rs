//! Expression model: owned trees for results, an index-addressed arena for
//! the search, evaluation with domain guards and rendering

mod arena;
mod ast;
mod display;
mod errors;
mod eval;
mod latex;

pub use arena::{Checkpoint, ExprArena, NodeId, NodeKind, Visit};
pub use ast::Expression;
pub use errors::ExpressionError;
