//! Iterative, forkable traversal of the range tree.
//!
//! Binary splitting is naturally recursive, but the per-node arithmetic cost
//! grows sharply toward the root, so control over *where* to fork matters
//! more than the shallow recursion depth. The walk therefore runs on an
//! explicit LIFO of tree nodes: any subtree can be handed to the worker pool
//! at a fork point, and once the parallelism budget is spent the rest of the
//! subtree is evaluated sequentially on whichever thread holds it.

use std::sync::Arc;

use tracing::debug;

use pisplit_core::error::ComputeError;
use pisplit_core::tree::RangeNode;
use pisplit_core::triple::{leaf, merge, Triple};

use crate::pool::TaskExecutor;

/// Fully evaluate the series over `root`'s range `[low, high)`.
///
/// `root` must be parentless. `budget` is the number of concurrent subtree
/// tasks this evaluation may put in flight; it halves at every fork and the
/// walk degrades to purely sequential once it reaches 1. A budget above the
/// pool's worker count can starve the forked joins; callers derive both
/// from the same core count.
pub fn evaluate(
    executor: &TaskExecutor,
    root: Arc<RangeNode>,
    budget: u32,
) -> Result<Triple, ComputeError> {
    if budget == 0 {
        return Err(ComputeError::InvalidBudget);
    }
    match walk(executor, root, budget)? {
        Some(triple) => Ok(triple),
        // Unreachable for a well-formed parentless root; surfaced as a fatal
        // fault rather than a silent empty result.
        None => Err(ComputeError::StackDrained),
    }
}

/// Walk `top`'s subtree. Returns the merged triple only when `top` is
/// parentless; a forked subtree instead delivers into its top node's parent
/// slot and finishes with an empty stack.
fn walk(
    executor: &TaskExecutor,
    top: Arc<RangeNode>,
    mut budget: u32,
) -> Result<Option<Triple>, ComputeError> {
    let mut stack = vec![top];
    while let Some(node) = stack.pop() {
        if node.is_leaf() {
            let term = leaf(node.low())?;
            match node.parent() {
                Some(parent) => parent.put_child(term, node.is_left())?,
                // A single-term range: the root itself is the leaf.
                None => return Ok(Some(term)),
            }
        } else if let Some((left, right)) = node.take_children() {
            let merged = merge(&left, &right);
            match node.parent() {
                Some(parent) => parent.put_child(merged, node.is_left())?,
                None => return Ok(Some(merged)),
            }
        } else {
            // First visit: park the node until its children resolve.
            let (left, right) = node.split();
            stack.push(node);
            if budget <= 1 {
                // Right below left so the earlier range is processed first;
                // the fixed order keeps the traversal deterministic.
                stack.push(right);
                stack.push(left);
            } else {
                let half = budget / 2;
                budget = 1;
                debug!(
                    low = left.low(),
                    high = right.high(),
                    child_budget = half,
                    "forking subtrees"
                );
                let left_task = {
                    let task_executor = executor.clone();
                    executor.submit(move || walk(&task_executor, left, half).map(|_| ()))
                };
                let right_task = {
                    let task_executor = executor.clone();
                    executor.submit(move || walk(&task_executor, right, half).map(|_| ()))
                };
                left_task.join()?;
                right_task.join()?;
            }
        }
    }
    Ok(None)
}
