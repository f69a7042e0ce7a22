//! Node arena with struct-of-arrays layout.
//!
//! [`NodeArena`] stores node kinds, spans, and analysis states in parallel
//! arrays indexed by [`NodeId`], with side tables for child-id lists,
//! array-literal items, and byte-literal blobs. Analysis rewrites a node by
//! replacing its kind in place ([`NodeArena::set_kind`]); there are no
//! parent back-pointers and no ownership cycles to manage.
//!
//! # Index spaces
//!
//! - `kinds`/`spans`/`states`: parallel arrays indexed by [`NodeId`]
//! - `children`: flat `Vec<NodeId>` addressed by [`NodeRange`]
//! - `items`: array-literal entries addressed by [`NodeRange`]
//! - `blobs`: byte-literal payloads indexed by [`BlobId`]

use crate::node::{NodeKind, NodeState};
use crate::span::Span;
use std::fmt;

/// Index into a [`NodeArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel indicating "no node". Used for optional children such as
    /// an array item without an explicit key.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    /// Create a new `NodeId` from a raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw index into the arena.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is a valid (non-sentinel) id.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "NodeId::INVALID")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A contiguous range of node ids in a [`NodeArena`]'s child list (or, for
/// array literals, its item table).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct NodeRange {
    pub start: u32,
    pub len: u16,
}

impl NodeRange {
    /// Empty range constant.
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    /// Create a new range.
    #[inline]
    #[must_use]
    pub const fn new(start: u32, len: u16) -> Self {
        Self { start, len }
    }

    /// Returns `true` if the range contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements in the range.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for NodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRange({}..{})", self.start, self.start + u32::from(self.len))
    }
}

/// Index into a [`NodeArena`]'s blob table.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct BlobId(u32);

impl BlobId {
    /// Create a new `BlobId` from a raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw index into the blob table.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", self.0)
    }
}

/// One entry of an array literal: `value` with an optional explicit `key`.
///
/// A missing key (`NodeId::INVALID`) means the guest's auto-append rule
/// assigns the next integer index at run time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayItem {
    key: NodeId,
    pub value: NodeId,
}

impl ArrayItem {
    /// An item with an explicit key expression.
    #[must_use]
    pub const fn keyed(key: NodeId, value: NodeId) -> Self {
        Self { key, value }
    }

    /// An item appended without a key.
    #[must_use]
    pub const fn unkeyed(value: NodeId) -> Self {
        Self { key: NodeId::INVALID, value }
    }

    /// The explicit key expression, if the item has one.
    #[must_use]
    pub fn key(&self) -> Option<NodeId> {
        self.key.is_valid().then_some(self.key)
    }
}

static_assert_size!(NodeId, 4);
static_assert_size!(NodeRange, 8);
static_assert_size!(ArrayItem, 8);

/// Convert a length to `u32`, panicking with context on overflow.
fn to_u32(n: usize, what: &str) -> u32 {
    u32::try_from(n).unwrap_or_else(|_| panic!("too many {what}: {n}"))
}

/// Convert a length to `u16`, panicking with context on overflow.
fn to_u16(n: usize, what: &str) -> u16 {
    u16::try_from(n).unwrap_or_else(|_| panic!("{what} too long: {n}"))
}

/// Arena for guest syntax nodes.
///
/// Struct-of-arrays for cache locality; all child relations are index
/// ranges, so a node is 16 bytes of kind plus 8 of span plus 2 of state
/// regardless of arity.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    /// Node kinds (parallel with spans and states).
    kinds: Vec<NodeKind>,
    /// Source spans (parallel with kinds).
    spans: Vec<Span>,
    /// Per-node analysis state (parallel with kinds).
    states: Vec<NodeState>,
    /// Flattened child-id lists addressed by `NodeRange`.
    children: Vec<NodeId>,
    /// Array-literal items addressed by `NodeRange`.
    items: Vec<ArrayItem>,
    /// Byte-literal payloads indexed by `BlobId`.
    blobs: Vec<Box<[u8]>>,
}

impl NodeArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena pre-allocated for a source of the given length.
    ///
    /// Same heuristic as the parser's: roughly one node per 20 bytes.
    #[must_use]
    pub fn with_capacity(source_len: usize) -> Self {
        let estimated = source_len / 20;
        Self {
            kinds: Vec::with_capacity(estimated),
            spans: Vec::with_capacity(estimated),
            states: Vec::with_capacity(estimated),
            children: Vec::with_capacity(estimated),
            items: Vec::new(),
            blobs: Vec::new(),
        }
    }

    /// Allocate a node, returning its id. The new node starts in
    /// `Phase::Created` with no access recorded.
    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::new(to_u32(self.kinds.len(), "nodes"));
        self.kinds.push(kind);
        self.spans.push(span);
        self.states.push(NodeState::default());
        id
    }

    /// The kind of a node.
    #[inline]
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.kinds[id.index()]
    }

    /// Replace a node's kind in place.
    ///
    /// This is the analysis rewrite primitive: folding replaces an
    /// expression by rewriting its kind to a literal, and parents replace
    /// child slots by rewriting their own kind with the new child id.
    #[inline]
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.kinds[id.index()] = kind;
    }

    /// The source span of a node.
    #[inline]
    #[must_use]
    pub fn span(&self, id: NodeId) -> Span {
        self.spans[id.index()]
    }

    /// The analysis state of a node.
    #[inline]
    #[must_use]
    pub fn state(&self, id: NodeId) -> NodeState {
        self.states[id.index()]
    }

    /// Mutable analysis state, for the pipeline's phase transitions.
    #[inline]
    pub fn state_mut(&mut self, id: NodeId) -> &mut NodeState {
        &mut self.states[id.index()]
    }

    /// Number of allocated nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if no nodes have been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Allocate a contiguous child-id list (args, parts, statements).
    pub fn push_children(&mut self, ids: &[NodeId]) -> NodeRange {
        if ids.is_empty() {
            return NodeRange::EMPTY;
        }
        let start = to_u32(self.children.len(), "child lists");
        self.children.extend_from_slice(ids);
        NodeRange::new(start, to_u16(ids.len(), "child list"))
    }

    /// The child ids of a range.
    #[must_use]
    pub fn children(&self, range: NodeRange) -> &[NodeId] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.children[start..start + range.len()]
    }

    /// Replace one slot of an existing child list.
    ///
    /// Used when analysis hands back a replacement id for a list element.
    pub fn set_child(&mut self, range: NodeRange, slot: usize, id: NodeId) {
        debug_assert!(slot < range.len(), "child slot {slot} out of range {range:?}");
        self.children[range.start as usize + slot] = id;
    }

    /// Allocate a contiguous run of array-literal items.
    pub fn push_items(&mut self, items: &[ArrayItem]) -> NodeRange {
        if items.is_empty() {
            return NodeRange::EMPTY;
        }
        let start = to_u32(self.items.len(), "array items");
        self.items.extend_from_slice(items);
        NodeRange::new(start, to_u16(items.len(), "array item list"))
    }

    /// The array items of a range.
    #[must_use]
    pub fn items(&self, range: NodeRange) -> &[ArrayItem] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.items[start..start + range.len()]
    }

    /// Store a byte-literal payload.
    pub fn push_blob(&mut self, bytes: Vec<u8>) -> BlobId {
        let id = BlobId::new(to_u32(self.blobs.len(), "blobs"));
        self.blobs.push(bytes.into_boxed_slice());
        id
    }

    /// The payload of a byte literal.
    #[must_use]
    pub fn blob(&self, id: BlobId) -> &[u8] {
        &self.blobs[id.index()]
    }
}
