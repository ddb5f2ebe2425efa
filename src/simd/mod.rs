//! The vector family: species, vectors, masks and shuffles.

pub mod convert;
pub mod element;
mod evaluator;
pub mod mask;
pub mod memory;
pub mod operators;
pub mod shape;
pub mod shuffle;
pub mod slice;
pub mod species;
pub mod traits;
pub mod vector;

pub use element::{Element, ElementKind, FloatElement, IntegralElement, Scalar};
pub use mask::Mask;
pub use memory::ByteOrder;
pub use operators::{Associative, Binary, Comparison, Conversion, Ternary, Test, Unary};
pub use shape::VectorShape;
pub use shuffle::{partially_wrap_index, wrap_index, Shuffle};
pub use species::*;
pub use vector::Vector;
