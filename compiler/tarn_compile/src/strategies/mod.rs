//! Per-kind compilation strategies.
//!
//! Stateless unit structs, one per node family; the registry owns the
//! kind-to-strategy mapping. Nothing here is public outside the crate:
//! callers go through the phase drivers.

mod array;
mod binary;
mod call;
mod cond;
mod consts;
mod literal;
mod stmt;
mod unary;
mod vars;

pub(crate) use array::ArrayLitCompiler;
pub(crate) use binary::{BinaryCompiler, ConcatChainCompiler};
pub(crate) use call::CallCompiler;
pub(crate) use cond::ConditionalCompiler;
pub(crate) use consts::{ConstDeclCompiler, ConstUseCompiler};
pub(crate) use literal::LiteralCompiler;
pub(crate) use stmt::{BlockCompiler, EchoCompiler, ExprStmtCompiler};
pub(crate) use unary::{IncDecCompiler, UnaryCompiler};
pub(crate) use vars::{AssignCompiler, IndexCompiler, VarCompiler};
