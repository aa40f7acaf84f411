//! Index-addressed expression storage used while searching.
//!
//! Nodes are appended to a flat `Vec` and refer to their children by
//! [`NodeId`]. A tree is identified by its root id, and two trees may share any
//! number of sub-trees. Replacing one sub-tree therefore only re-creates the
//! ancestors on the path to the root; every untouched sibling is reused by id.
//!
//! Every node caches its size when it is created and memoizes its value the
//! first time it is evaluated. Nodes are never mutated after construction, so
//! a memoized value stays valid for the lifetime of the node.
//!
//! Candidates that are abandoned or rejected are discarded with
//! [`ExprArena::checkpoint`] / [`ExprArena::rollback`], which truncates the
//! arena back to the state before the candidate was built.

use std::cell::OnceCell;

use crate::expression::ast::Expression;
use crate::expression::errors::ExpressionError;
use crate::inputs::{DigitLease, Operator, PoolError};

/// Position of a node inside an [`ExprArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Shape of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf(u8),
    Unary(Operator, NodeId),
    Binary(Operator, NodeId, NodeId),
}

impl NodeKind {
    fn children(self) -> [Option<NodeId>; 2] {
        match self {
            NodeKind::Leaf(_) => [None, None],
            NodeKind::Unary(_, c) => [Some(c), None],
            NodeKind::Binary(_, l, r) => [Some(l), Some(r)],
        }
    }

    fn operator(self) -> Option<Operator> {
        match self {
            NodeKind::Leaf(_) => None,
            NodeKind::Unary(op, _) | NodeKind::Binary(op, _, _) => Some(op),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    size: usize,
    value: OnceCell<Result<f64, ExpressionError>>,
}

/// Marker returned by [`ExprArena::checkpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// A node of a tree together with the link to its parent, as produced by
/// [`ExprArena::walk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub id: NodeId,
    /// Index of the parent inside the walk, `None` for the root
    pub parent: Option<usize>,
    /// Operand position of this node under its parent
    pub slot: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    nodes: Vec<Node>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node. All previously issued ids become dangling.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    #[inline]
    fn node(&self, id: NodeId) -> Result<&Node, ExpressionError> {
        self.nodes
            .get(id.index())
            .ok_or(ExpressionError::DanglingNode(id.index()))
    }

    fn push(&mut self, kind: NodeKind, size: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            size,
            value: OnceCell::new(),
        });
        id
    }

    /// Place a leaf, consuming one unit of `digit` from the lease
    ///
    /// # Errors
    ///
    /// Returns the pool error if no unit of `digit` is available; the arena is
    /// left unchanged then.
    pub fn leaf(&mut self, lease: &mut DigitLease<'_>, digit: u8) -> Result<NodeId, PoolError> {
        lease.take(digit)?;
        Ok(self.push(NodeKind::Leaf(digit), 1))
    }

    /// Combine already built children under `op`
    ///
    /// # Errors
    ///
    /// Returns `ArityMismatch` when `children.len() != op.arity()` and
    /// `DanglingNode` when a child id is unknown.
    pub fn combine(&mut self, op: Operator, children: &[NodeId]) -> Result<NodeId, ExpressionError> {
        let kind = match (op.arity(), children) {
            (1, &[child]) => NodeKind::Unary(op, child),
            (2, &[left, right]) => NodeKind::Binary(op, left, right),
            _ => {
                return Err(ExpressionError::ArityMismatch {
                    operator: op.symbol(),
                    expected: op.arity(),
                    found: children.len(),
                });
            }
        };

        let mut size = 1;
        for &child in children {
            size += self.node(child)?.size;
        }
        Ok(self.push(kind, size))
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id.index()).map(|n| n.kind)
    }

    /// Node count of the tree rooted at `id`; zero for unknown ids
    pub fn size(&self, id: NodeId) -> usize {
        self.nodes.get(id.index()).map_or(0, |n| n.size)
    }

    /// Value of the tree rooted at `id`, computed once and memoized
    ///
    /// # Errors
    ///
    /// Returns the first domain-guard failure found post-order, or
    /// `DanglingNode` for unknown ids.
    pub fn evaluate(&self, id: NodeId) -> Result<f64, ExpressionError> {
        let node = self.node(id)?;
        *node.value.get_or_init(|| self.compute(node.kind))
    }

    fn compute(&self, kind: NodeKind) -> Result<f64, ExpressionError> {
        match kind {
            NodeKind::Leaf(digit) => Ok(f64::from(digit)),
            NodeKind::Unary(op, child) => op.evaluate(&[self.evaluate(child)?]),
            NodeKind::Binary(op, left, right) => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                op.evaluate(&[l, r])
            }
        }
    }

    /// All nodes of the tree rooted at `root` in pre-order, with parent links
    pub fn walk(&self, root: NodeId) -> Vec<Visit> {
        let mut visits = Vec::new();
        let mut stack = vec![Visit {
            id: root,
            parent: None,
            slot: 0,
        }];

        while let Some(visit) = stack.pop() {
            let Some(kind) = self.kind(visit.id) else {
                continue;
            };
            let position = visits.len();
            visits.push(visit);

            for (slot, child) in kind.children().into_iter().enumerate().rev() {
                if let Some(child) = child {
                    stack.push(Visit {
                        id: child,
                        parent: Some(position),
                        slot,
                    });
                }
            }
        }

        visits
    }

    /// Digits of every leaf below `root`, left to right
    pub fn leaves(&self, root: NodeId) -> Vec<u8> {
        self.walk(root)
            .into_iter()
            .filter_map(|visit| match self.kind(visit.id) {
                Some(NodeKind::Leaf(digit)) => Some(digit),
                _ => None,
            })
            .collect()
    }

    /// Rebuild the ancestors of a replaced node.
    ///
    /// `path` lists `(ancestor, slot)` pairs from the root down to the parent
    /// of the replaced node, where `slot` is the operand position taken by the
    /// next node on the path. Siblings are shared, only the ancestors are new.
    ///
    /// # Errors
    ///
    /// Returns `DanglingNode` when an ancestor id is unknown.
    pub fn relink(
        &mut self,
        path: &[(NodeId, usize)],
        replacement: NodeId,
    ) -> Result<NodeId, ExpressionError> {
        let mut current = replacement;

        for &(ancestor, slot) in path.iter().rev() {
            let kind = self
                .kind(ancestor)
                .ok_or(ExpressionError::DanglingNode(ancestor.index()))?;
            // a leaf can never be an ancestor
            let op = kind
                .operator()
                .ok_or(ExpressionError::DanglingNode(ancestor.index()))?;
            let mut children = kind.children();
            if let Some(child) = children.get_mut(slot) {
                *child = Some(current);
            }
            let children: Vec<NodeId> = children.into_iter().flatten().collect();
            current = self.combine(op, &children)?;
        }

        Ok(current)
    }

    /// Copy the tree rooted at `id` into an owned [`Expression`]
    ///
    /// # Errors
    ///
    /// Returns `DanglingNode` when the tree references an unknown id.
    pub fn to_expression(&self, id: NodeId) -> Result<Expression, ExpressionError> {
        match self.node(id)?.kind {
            NodeKind::Leaf(digit) => Ok(Expression::Digit(digit)),
            NodeKind::Unary(op, child) => {
                Expression::from_operator(op, vec![self.to_expression(child)?])
            }
            NodeKind::Binary(op, left, right) => Expression::from_operator(
                op,
                vec![self.to_expression(left)?, self.to_expression(right)?],
            ),
        }
    }

    /// Copy an owned expression into the arena without touching any pool.
    /// Used to carry an already accounted-for tree into a fresh arena.
    pub fn insert_expression(&mut self, expr: &Expression) -> Result<NodeId, ExpressionError> {
        if let Expression::Digit(d) = expr {
            return Ok(self.push(NodeKind::Leaf(*d), 1));
        }

        let children = expr
            .children()
            .into_iter()
            .map(|child| self.insert_expression(child))
            .collect::<Result<Vec<_>, _>>()?;
        match expr.operator() {
            Some(op) => self.combine(op, &children),
            None => Err(ExpressionError::ArityMismatch {
                operator: "digit",
                expected: 0,
                found: children.len(),
            }),
        }
    }

    /// Fully parenthesized text of the tree rooted at `id`
    ///
    /// # Errors
    ///
    /// Returns `DanglingNode` when the tree references an unknown id.
    pub fn render(&self, id: NodeId) -> Result<String, ExpressionError> {
        Ok(self.to_expression(id)?.to_string())
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.nodes.len())
    }

    /// Discard every node created after `mark`. Ids issued after the
    /// checkpoint must not be used afterwards.
    pub fn rollback(&mut self, mark: Checkpoint) {
        self.nodes.truncate(mark.0);
    }
}
