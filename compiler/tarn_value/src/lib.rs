//! Tarn Value - Guest Values & Coercion Engine
//!
//! This crate is the compile-time model of Tarn run-time values:
//! - [`GuestValue`], every value a constant expression can take
//! - [`GuestArray`], an insertion-ordered map with normalized keys
//! - [`classify_number`], the three-width scan behind text → number
//! - [`convert`], the implicit conversions between value kinds
//! - [`ops`], operator semantics returning [`Coerced`] results
//!
//! # Design Philosophy
//!
//! - **Total**: every conversion and every operator produces a value
//! - **Flagged, not thrown**: degradations surface as [`CoercionFlags`]
//! - **Run-time faithful**: replacing an expression with its folded
//!   value must be invisible to the running program
//!
//! `GuestValue` stores live `f64`s; literal nodes in the IR keep the
//! bits instead, and the node compilers convert at the boundary.

mod array;
pub mod convert;
mod number;
pub mod ops;
mod value;

pub use array::{ArrayKey, GuestArray};
pub use number::{classify_number, NumberClassification, NumberInfo};
pub use ops::{Coerced, CoercionFlags};
pub use value::{GuestValue, Heap};
