//! Core data types: values, colors and the block tree.

pub mod block;
pub mod color;
pub mod value;

pub use block::{ArgDef, Block, BlockId, Prop, Special, Stylesheet};
pub use color::Color;
pub use value::{BinOp, ListDelim, Value};
