//! Patient-transfer requests and the pending-transfer triage queue.
//!
//! # Ordering
//!
//! Pending transfers are served strictly by priority tier — `Critical`
//! before `High` before `Medium` before `Low` before `Routine` — and FIFO
//! within a tier.  The queue is a binary min-heap keyed by
//! `(priority rank, sequence number)`: the rank inverts the tier so the
//! most urgent pops first, and the monotonically increasing sequence makes
//! equal-rank pops deterministic in arrival order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use metro_core::{FacilityId, NodeId, TransferId};
use rustc_hash::FxHashMap;

// ── Priority ──────────────────────────────────────────────────────────────────

/// Urgency tier of a patient transfer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TransferPriority {
    Critical,
    High,
    Medium,
    Low,
    Routine,
}

impl TransferPriority {
    /// Heap rank: lower pops first.
    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            TransferPriority::Critical => 0,
            TransferPriority::High     => 1,
            TransferPriority::Medium   => 2,
            TransferPriority::Low      => 3,
            TransferPriority::Routine  => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransferPriority::Critical => "critical",
            TransferPriority::High     => "high",
            TransferPriority::Medium   => "medium",
            TransferPriority::Low      => "low",
            TransferPriority::Routine  => "routine",
        }
    }
}

impl std::fmt::Display for TransferPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PatientTransfer ───────────────────────────────────────────────────────────

/// A request to move a patient between two hospitals by ambulance.
///
/// Ownership follows the lifecycle: the pending queue owns a queued
/// transfer; the executing ambulance owns it by value while active; it is
/// dropped on completion.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientTransfer {
    pub id: TransferId,
    /// Patient display name (opaque to the core).
    pub patient: String,
    pub source_hospital: FacilityId,
    pub dest_hospital: FacilityId,
    /// Graph node of the source hospital.
    pub source_node: NodeId,
    /// Graph node of the destination hospital.
    pub dest_node: NodeId,
    pub priority: TransferPriority,
    /// Free-text medical condition, carried for dispatch logs.
    pub condition: String,
}

// ── TransferQueue ─────────────────────────────────────────────────────────────

/// Priority queue of pending transfers: strict tier ordering, FIFO within a
/// tier.
#[derive(Default)]
pub struct TransferQueue {
    heap: BinaryHeap<Reverse<(u8, u64, TransferId)>>,
    entries: FxHashMap<TransferId, PatientTransfer>,
    seq: u64,
}

impl TransferQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a transfer.
    pub fn push(&mut self, transfer: PatientTransfer) {
        self.heap
            .push(Reverse((transfer.priority.rank(), self.seq, transfer.id)));
        self.seq += 1;
        self.entries.insert(transfer.id, transfer);
    }

    /// Remove and return the most urgent transfer (FIFO within a tier).
    pub fn pop(&mut self) -> Option<PatientTransfer> {
        while let Some(Reverse((_, _, id))) = self.heap.pop() {
            // Entries cancelled via `remove` leave stale heap keys behind;
            // skip them lazily.
            if let Some(t) = self.entries.remove(&id) {
                return Some(t);
            }
        }
        None
    }

    /// The most urgent pending transfer, without removing it.
    pub fn peek(&self) -> Option<&PatientTransfer> {
        self.heap
            .iter()
            .filter_map(|Reverse(key)| self.entries.get(&key.2).map(|t| (key, t)))
            .min_by_key(|(key, _)| **key)
            .map(|(_, t)| t)
    }

    /// Cancel a pending transfer by ID.  Returns the transfer if it was
    /// still queued.
    pub fn remove(&mut self, id: TransferId) -> Option<PatientTransfer> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: TransferId) -> Option<&PatientTransfer> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
