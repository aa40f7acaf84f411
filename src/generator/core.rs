use log::trace;
use rand::Rng;
use rand::seq::{IndexedRandom, IteratorRandom};

use crate::expression::{ExprArena, NodeId, NodeKind};
use crate::inputs::{DigitLease, DigitPool, Operator, OperatorRegistry};

use super::constants::{
    BINARY_WEIGHT, DEFAULT_MAX_SIZE, DEFAULT_PERTURBATION_RATIO, LEAF_WEIGHT, STOP_WEIGHT,
    UNARY_WEIGHT,
};

/// How a candidate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Constructed,
    Perturbed,
}

/// Root of a freshly generated tree inside the caller's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub root: NodeId,
    pub kind: CandidateKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Leaf,
    Unary,
    Binary,
    Stop,
}

/// Randomized producer of pool-consistent expression trees.
///
/// Every public method leaves the digit pool balanced and, when it gives up,
/// truncates the arena back to where it was.
#[derive(Debug, Clone)]
pub struct CandidateGenerator<'a, R> {
    operators: &'a OperatorRegistry,
    rng: R,
    max_size: usize,
    perturbation_ratio: f64,
}

impl<'a, R: Rng> CandidateGenerator<'a, R> {
    pub fn new(operators: &'a OperatorRegistry, rng: R) -> Self {
        Self {
            operators,
            rng,
            max_size: DEFAULT_MAX_SIZE,
            perturbation_ratio: DEFAULT_PERTURBATION_RATIO,
        }
    }

    /// Limit the node count of generated trees (at least one node)
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// Probability of perturbing the incumbent instead of building from scratch.
    /// Values outside `[0, 1]` fall back to the default.
    pub fn with_perturbation_ratio(mut self, ratio: f64) -> Self {
        self.perturbation_ratio = if (0.0..=1.0).contains(&ratio) {
            ratio
        } else {
            DEFAULT_PERTURBATION_RATIO
        };
        self
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Produce the next candidate: a perturbation of `incumbent` with
    /// probability `perturbation_ratio`, a fresh construction otherwise.
    /// Returns `None` when the attempt had to be abandoned.
    pub fn next_candidate(
        &mut self,
        arena: &mut ExprArena,
        pool: &mut DigitPool,
        incumbent: Option<NodeId>,
    ) -> Option<Candidate> {
        match incumbent {
            Some(root) if self.rng.random_bool(self.perturbation_ratio) => {
                self.perturb(arena, pool, root).map(|root| Candidate {
                    root,
                    kind: CandidateKind::Perturbed,
                })
            }
            _ => self.construct(arena, pool).map(|root| Candidate {
                root,
                kind: CandidateKind::Constructed,
            }),
        }
    }

    /// Build a tree bottom-up from the pool
    pub fn construct(&mut self, arena: &mut ExprArena, pool: &mut DigitPool) -> Option<NodeId> {
        let mark = arena.checkpoint();
        let mut lease = pool.lease();
        let built = self.build(arena, &mut lease, self.max_size);
        if built.is_none() {
            arena.rollback(mark);
        }
        built
    }

    /// Replace one random sub-tree of `root` with a freshly built one.
    ///
    /// The replacement may use the digits the old sub-tree consumed plus any
    /// unit the rest of the tree leaves unused. Ancestors of the replaced
    /// node are re-created, every other node is shared with `root`.
    pub fn perturb(
        &mut self,
        arena: &mut ExprArena,
        pool: &mut DigitPool,
        root: NodeId,
    ) -> Option<NodeId> {
        let mark = arena.checkpoint();
        let perturbed = self.replace_subtree(arena, pool, root);
        if perturbed.is_none() {
            arena.rollback(mark);
        }
        perturbed
    }

    fn replace_subtree(
        &mut self,
        arena: &mut ExprArena,
        pool: &mut DigitPool,
        root: NodeId,
    ) -> Option<NodeId> {
        let visits = arena.walk(root);
        if visits.is_empty() {
            return None;
        }
        let position = self.rng.random_range(0..visits.len());
        let target = *visits.get(position)?;
        let subtree = position..position + arena.size(target.id);

        // (ancestor, slot) pairs from the root down to the target's parent
        let mut path = Vec::new();
        let mut cursor = target;
        while let Some(parent_position) = cursor.parent {
            let parent = *visits.get(parent_position)?;
            path.push((parent.id, cursor.slot));
            cursor = parent;
        }
        path.reverse();

        let mut lease = pool.lease();
        for (i, visit) in visits.iter().enumerate() {
            if subtree.contains(&i) {
                continue;
            }
            if let Some(NodeKind::Leaf(digit)) = arena.kind(visit.id) {
                // An incumbent that does not fit the pool cannot be perturbed
                lease.take(digit).ok()?;
            }
        }

        let budget = self.max_size.saturating_sub(arena.size(root) - subtree.len());
        let replacement = self.build(arena, &mut lease, budget)?;
        trace!(
            "Replacing sub-tree of {} nodes with one of {} nodes",
            subtree.len(),
            arena.size(replacement)
        );
        arena.relink(&path, replacement).ok()
    }

    /// Weighted pick; `None` when nothing is possible
    fn pick_action(&mut self, choices: &[(Action, f64)]) -> Option<Action> {
        choices
            .choose_weighted(&mut self.rng, |&(_, weight)| weight)
            .ok()
            .map(|&(action, _)| action)
    }

    fn pick_unary(&mut self, arena: &ExprArena, top: NodeId) -> Option<Operator> {
        let top_is_neg = matches!(arena.kind(top), Some(NodeKind::Unary(Operator::Neg, _)));
        self.operators
            .unary()
            .iter()
            .filter(|op| !(top_is_neg && **op == Operator::Neg))
            .choose(&mut self.rng)
            .copied()
    }

    /// Constructive step. Keeps a stack of finished sub-expressions and
    /// repeatedly places a leaf, wraps the top with a unary operator or
    /// merges the two topmost entries with a binary operator, until the leaf
    /// budget is spent and a single tree remains.
    fn build(
        &mut self,
        arena: &mut ExprArena,
        lease: &mut DigitLease<'_>,
        max_size: usize,
    ) -> Option<NodeId> {
        let available = usize::try_from(lease.total_available()).ok()?;
        if available == 0 || max_size == 0 {
            return None;
        }

        let max_leaves = if self.operators.binary().is_empty() {
            1
        } else {
            max_size.div_ceil(2)
        };
        let mut leaves_left = self.rng.random_range(1..=available.min(max_leaves));
        let mut stack: Vec<NodeId> = Vec::with_capacity(leaves_left);
        let mut nodes = 0usize;

        loop {
            let top = stack.last().copied();
            let pending_merges = (stack.len() + leaves_left).saturating_sub(1);
            let projected = nodes + leaves_left + pending_merges;

            let mut choices: Vec<(Action, f64)> = Vec::with_capacity(4);
            if leaves_left > 0 && lease.total_available() > 0 {
                choices.push((Action::Leaf, LEAF_WEIGHT));
            }
            if stack.len() >= 2 && !self.operators.binary().is_empty() {
                choices.push((Action::Binary, BINARY_WEIGHT));
            }
            if top.is_some() && !self.operators.unary().is_empty() && projected < max_size {
                choices.push((Action::Unary, UNARY_WEIGHT));
            }
            if leaves_left == 0 && stack.len() == 1 {
                choices.push((Action::Stop, STOP_WEIGHT));
            }

            let Some(action) = self.pick_action(&choices) else {
                trace!(
                    "Abandoning construction with {} pending sub-expressions",
                    stack.len()
                );
                return None;
            };

            match action {
                Action::Leaf => {
                    let digit = lease.available_digits().choose(&mut self.rng)?;
                    stack.push(arena.leaf(lease, digit).ok()?);
                    leaves_left -= 1;
                    nodes += 1;
                }
                Action::Unary => {
                    let child = stack.pop()?;
                    match self.pick_unary(arena, child) {
                        Some(op) => {
                            stack.push(arena.combine(op, &[child]).ok()?);
                            nodes += 1;
                        }
                        // only `neg` is enabled and the top already is one
                        None => stack.push(child),
                    }
                }
                Action::Binary => {
                    let right = stack.pop()?;
                    let left = stack.pop()?;
                    let op = *self.operators.binary().choose(&mut self.rng)?;
                    stack.push(arena.combine(op, &[left, right]).ok()?);
                    nodes += 1;
                }
                Action::Stop => return stack.pop(),
            }
        }
    }
}
