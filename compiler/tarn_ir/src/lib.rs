//! Tarn IR - Core Representation Types
//!
//! This crate contains the shared data structures for the Tarn compiler:
//! - Spans for source locations
//! - `LineIndex` for offset/line/column mapping over guest source text
//! - Names for interned identifiers
//! - Syntax nodes (`NodeKind`) and the struct-of-arrays `NodeArena`
//! - `SourceUnit`, one compilable body of guest code
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Flatten Everything**: No Box<Node>, use NodeId(u32) indices
//! - **Fail Fast**: out-of-range positions are caller bugs, surfaced as errors
//!
//! Types that contain floats store them as u64 bits for Hash compatibility.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod interner;
mod line_index;
mod name;
mod node;
mod span;
mod unit;

pub use arena::{ArrayItem, BlobId, NodeArena, NodeId, NodeRange};
pub use interner::{Interner, SharedInterner};
pub use line_index::{LineIndex, PositionError};
pub use name::Name;
pub use node::{Access, BinaryOp, IncDecOp, NodeKind, NodeState, Phase, UnaryOp};
pub use span::{Span, SpanError};
pub use unit::{SourceUnit, UnitBuilder};
