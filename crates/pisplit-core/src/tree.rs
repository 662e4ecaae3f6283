//! Explicit range tree for the binary-splitting traversal.
//!
//! Nodes carry parent back-links so the walk can run on an explicit stack
//! and deliver results upward from any worker thread. Each child slot is
//! written at most once; a node merges only after one atomic take of both
//! slots. Release is ownership-based: [`RangeNode::take_children`] moves the
//! triples out, and dropping the popped `Arc` after delivery frees the node
//! together with its parent back-link reference, so the large triples near the
//! top of the tree never outlive the single merge that consumes them.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ComputeError;
use crate::triple::Triple;

/// A half-open index range `[low, high)` in the series term tree.
#[derive(Debug)]
pub struct RangeNode {
    low: u64,
    high: u64,
    is_left: bool,
    parent: Option<Arc<RangeNode>>,
    slots: Mutex<ChildSlots>,
}

#[derive(Debug, Default)]
struct ChildSlots {
    left: Option<Triple>,
    right: Option<Triple>,
}

impl RangeNode {
    /// Create a parentless node covering `[low, high)`.
    pub fn root(low: u64, high: u64) -> Arc<Self> {
        Arc::new(Self {
            low,
            high,
            is_left: false,
            parent: None,
            slots: Mutex::new(ChildSlots::default()),
        })
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn high(&self) -> u64 {
        self.high
    }

    /// Whether this node fills its parent's left slot.
    pub fn is_left(&self) -> bool {
        self.is_left
    }

    pub fn parent(&self) -> Option<&Arc<RangeNode>> {
        self.parent.as_ref()
    }

    /// A node is a leaf when it covers exactly one series term.
    pub fn is_leaf(&self) -> bool {
        self.high == self.low + 1
    }

    /// Split into `[low, mid)` and `[mid, high)` children back-linked to
    /// `self`. Must not be called on a leaf.
    pub fn split(self: &Arc<Self>) -> (Arc<RangeNode>, Arc<RangeNode>) {
        debug_assert!(!self.is_leaf(), "cannot split a single-term range");
        let mid = self.low + (self.high - self.low) / 2;
        let left = Arc::new(RangeNode {
            low: self.low,
            high: mid,
            is_left: true,
            parent: Some(Arc::clone(self)),
            slots: Mutex::new(ChildSlots::default()),
        });
        let right = Arc::new(RangeNode {
            low: mid,
            high: self.high,
            is_left: false,
            parent: Some(Arc::clone(self)),
            slots: Mutex::new(ChildSlots::default()),
        });
        (left, right)
    }

    /// Deliver a child's computed triple into the indicated slot.
    ///
    /// Sibling slots may be written concurrently from different workers; the
    /// writes land under the node's mutex. Writing the same slot twice is an
    /// internal-invariant violation.
    pub fn put_child(&self, triple: Triple, is_left: bool) -> Result<(), ComputeError> {
        let mut slots = self.slots.lock();
        let slot = if is_left { &mut slots.left } else { &mut slots.right };
        if slot.is_some() {
            return Err(ComputeError::SlotOccupied {
                low: self.low,
                high: self.high,
            });
        }
        *slot = Some(triple);
        Ok(())
    }

    /// Consume both child triples, or `None` while either is still pending.
    ///
    /// The ready-check and both reads happen under one lock acquisition, so
    /// a caller can never observe one slot written and its sibling mid-write.
    pub fn take_children(&self) -> Option<(Triple, Triple)> {
        let mut slots = self.slots.lock();
        if slots.left.is_none() || slots.right.is_none() {
            return None;
        }
        let left = slots.left.take()?;
        let right = slots.right.take()?;
        Some((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triple::leaf;

    #[test]
    fn leaf_detection() {
        assert!(RangeNode::root(1, 2).is_leaf());
        assert!(!RangeNode::root(1, 3).is_leaf());
    }

    #[test]
    fn split_halves_the_range() {
        let node = RangeNode::root(1, 10);
        let (left, right) = node.split();
        assert_eq!((left.low(), left.high()), (1, 5));
        assert_eq!((right.low(), right.high()), (5, 10));
        assert!(left.is_left());
        assert!(!right.is_left());
        assert_eq!(left.parent().unwrap().low(), 1);
    }

    #[test]
    fn children_become_ready_only_after_both_deliveries() {
        let node = RangeNode::root(1, 3);
        assert!(node.take_children().is_none());

        node.put_child(leaf(1).unwrap(), true).unwrap();
        // One delivered triple must survive an early take attempt.
        assert!(node.take_children().is_none());

        node.put_child(leaf(2).unwrap(), false).unwrap();
        let (left, right) = node.take_children().unwrap();
        assert_eq!(left, leaf(1).unwrap());
        assert_eq!(right, leaf(2).unwrap());

        // Consumed exactly once.
        assert!(node.take_children().is_none());
    }

    #[test]
    fn double_delivery_is_rejected() {
        let node = RangeNode::root(1, 3);
        node.put_child(leaf(1).unwrap(), true).unwrap();
        assert_eq!(
            node.put_child(leaf(1).unwrap(), true),
            Err(ComputeError::SlotOccupied { low: 1, high: 3 })
        );
    }
}
