//! The transition table: an insertion-ordered list of `(source, trigger) -> target` edges.
//!
//! Lookup is a linear scan that returns the first match, so the table needs no index and no
//! hashing. Machines in this domain carry tens of edges and fire far less often than they
//! tick, which keeps the scan cheap.
//!
//! Storage is pluggable through [`EdgeStore`]:
//!
//! - [`GrowableEdges`] lives on the heap and grows according to a [`GrowthPolicy`] only when
//!   the next insert would exceed its capacity.
//! - `heapless::Vec<Edge, N>` is sized at compile time and never allocates. Inserting into a
//!   full one fails with [`FsmError::TableFull`].

use alloc::vec::Vec;
use core::num::NonZeroUsize;

use crate::error::FsmError;
use crate::state::StateId;
use crate::trigger::Trigger;

/// Edge slots reserved by a default table.
pub const DEFAULT_CAPACITY: usize = 1;

/// An immutable transition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    source: StateId,
    trigger: Trigger,
    target: StateId,
}

impl Edge {
    #[must_use]
    pub const fn new(source: StateId, trigger: Trigger, target: StateId) -> Self {
        Self {
            source,
            trigger,
            target,
        }
    }

    #[must_use]
    pub const fn source(&self) -> StateId {
        self.source
    }

    #[must_use]
    pub const fn trigger(&self) -> Trigger {
        self.trigger
    }

    #[must_use]
    pub const fn target(&self) -> StateId {
        self.target
    }

    fn matches(&self, source: StateId, trigger: Trigger) -> bool {
        self.source == source && self.trigger == trigger
    }
}

/// How a [`GrowableEdges`] store enlarges itself when full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Add a fixed number of slots. Keeps memory overshoot bounded on small heaps.
    Increment(NonZeroUsize),
    /// Double the capacity (at least one slot).
    Double,
}

impl GrowthPolicy {
    /// Slots added per growth step by the default policy.
    pub const DEFAULT_INCREMENT: NonZeroUsize = match NonZeroUsize::new(4) {
        Some(step) => step,
        None => unreachable!(),
    };

    /// Capacity after one growth step from `capacity`.
    #[must_use]
    pub fn next_capacity(self, capacity: usize) -> usize {
        match self {
            Self::Increment(step) => capacity.saturating_add(step.get()),
            Self::Double => capacity.saturating_mul(2).max(1),
        }
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::Increment(Self::DEFAULT_INCREMENT)
    }
}

/// Backing storage for a [`TransitionTable`].
pub trait EdgeStore {
    /// Edges in insertion order.
    fn as_slice(&self) -> &[Edge];

    /// Slots currently available without reallocating.
    fn capacity(&self) -> usize;

    /// Appends `edge`, handing it back if the store cannot take it.
    ///
    /// # Errors
    /// Returns `Err(edge)` when a fixed-capacity store is full.
    fn try_push(&mut self, edge: Edge) -> Result<(), Edge>;
}

/// Heap-backed edge storage that grows by a [`GrowthPolicy`].
#[derive(Debug, Clone)]
pub struct GrowableEdges {
    edges: Vec<Edge>,
    slots: usize,
    policy: GrowthPolicy,
}

impl GrowableEdges {
    /// Reserves `capacity` slots (at least one) and grows with `policy` afterwards.
    #[must_use]
    pub fn new(capacity: usize, policy: GrowthPolicy) -> Self {
        let slots = capacity.max(1);
        Self {
            edges: Vec::with_capacity(slots),
            slots,
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }
}

impl Default for GrowableEdges {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, GrowthPolicy::default())
    }
}

impl EdgeStore for GrowableEdges {
    fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    fn capacity(&self) -> usize {
        self.slots
    }

    fn try_push(&mut self, edge: Edge) -> Result<(), Edge> {
        if self.edges.len() == self.slots {
            let grown = self.policy.next_capacity(self.slots);
            // Allocation failure here aborts through the global allocator.
            self.edges.reserve_exact(grown - self.edges.len());
            self.slots = grown;
        }
        self.edges.push(edge);
        Ok(())
    }
}

impl<const N: usize> EdgeStore for heapless::Vec<Edge, N> {
    fn as_slice(&self) -> &[Edge] {
        self
    }

    fn capacity(&self) -> usize {
        N
    }

    fn try_push(&mut self, edge: Edge) -> Result<(), Edge> {
        self.push(edge)
    }
}

/// Capacity change caused by an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Growth {
    pub from: usize,
    pub to: usize,
}

/// Ordered collection of every registered edge.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable<E = GrowableEdges> {
    store: E,
}

impl TransitionTable<GrowableEdges> {
    /// A heap-backed table with one slot and the default growth policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A heap-backed table pre-sized for `capacity` edges.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_policy(capacity, GrowthPolicy::default())
    }

    #[must_use]
    pub fn with_policy(capacity: usize, policy: GrowthPolicy) -> Self {
        Self::from_store(GrowableEdges::new(capacity, policy))
    }
}

impl<const N: usize> TransitionTable<heapless::Vec<Edge, N>> {
    /// A table with room for exactly `N` edges and no heap use for edge storage.
    #[must_use]
    pub const fn fixed() -> Self {
        Self {
            store: heapless::Vec::new(),
        }
    }
}

impl<E: EdgeStore> TransitionTable<E> {
    #[must_use]
    pub const fn from_store(store: E) -> Self {
        Self { store }
    }

    /// Appends an edge after every existing one.
    ///
    /// No duplicate check is made: a second edge for an existing `(source, trigger)` pair is
    /// stored but never found, because lookup stops at the first match.
    ///
    /// # Errors
    /// Returns [`FsmError::TableFull`] when a fixed-capacity store has no free slot.
    pub fn push(&mut self, edge: Edge) -> Result<Option<Growth>, FsmError> {
        let before = self.store.capacity();
        self.store
            .try_push(edge)
            .map_err(|_| FsmError::TableFull { capacity: before })?;
        let after = self.store.capacity();
        Ok((after != before).then_some(Growth {
            from: before,
            to: after,
        }))
    }

    /// First edge leaving `source` on `trigger`, in insertion order.
    #[must_use]
    pub fn find(&self, source: StateId, trigger: Trigger) -> Option<&Edge> {
        self.edges().iter().find(|edge| edge.matches(source, trigger))
    }

    /// Every edge leaving `source`, in insertion order.
    pub fn edges_from(&self, source: StateId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges()
            .iter()
            .filter(move |edge| edge.source == source)
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        self.store.as_slice()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    #[must_use]
    pub fn store(&self) -> &E {
        &self.store
    }
}
