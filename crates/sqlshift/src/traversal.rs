//! Tree traversal utilities for SQL expression ASTs.
//!
//! Nodes own their children, so there are no parent pointers inside the
//! AST. Upward navigation goes through [`TreeContext`], a side table built
//! on demand that maps every node to its parent, argument role and list
//! index. Because ownership guarantees each node sits in exactly one slot,
//! a context built after any mutation always reflects the current tree.
//!
//! Walking is lazy: [`DfsIter`] (pre-order, optionally with depth) and
//! [`BfsIter`] (level order) only expand a node's children when it is
//! yielded, and every call to [`ExpressionWalk::walk`] starts afresh.

use crate::error::Result;
use crate::expressions::Expression;
use std::collections::VecDeque;

/// Index of a node within a [`TreeContext`], assigned in pre-order
pub type NodeId = usize;

/// Where a node is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentInfo {
    /// `None` for the root
    pub parent_id: Option<NodeId>,
    /// Argument role in the parent, empty for the root
    pub arg_key: &'static str,
    /// Position if the role holds a list
    pub index: Option<usize>,
}

/// External parent-tracking context for an expression tree.
///
/// ```
/// use sqlshift::parse_one;
/// use sqlshift::dialects::DialectType;
/// use sqlshift::expressions::ExpressionKind;
/// use sqlshift::traversal::{ExpressionWalk, TreeContext};
///
/// let tree = parse_one("SELECT a FROM t WHERE b = 1", DialectType::Generic).unwrap();
/// let ctx = TreeContext::build(&tree);
/// let b = tree.find(|e| e.name() == Some("b")).unwrap();
/// let parent = ctx.parent(b).unwrap();
/// assert_eq!(parent.kind(), ExpressionKind::Eq);
/// assert_eq!(ctx.arg_key(b), Some("this"));
/// ```
#[derive(Debug)]
pub struct TreeContext<'a> {
    nodes: Vec<&'a Expression>,
    parents: Vec<ParentInfo>,
}

impl<'a> TreeContext<'a> {
    pub fn build(root: &'a Expression) -> Self {
        let mut ctx = Self {
            nodes: Vec::new(),
            parents: Vec::new(),
        };
        ctx.visit(root, None, "", None);
        ctx
    }

    fn visit(&mut self, expr: &'a Expression, parent_id: Option<NodeId>, arg_key: &'static str, index: Option<usize>) {
        let id = self.nodes.len();
        self.nodes.push(expr);
        self.parents.push(ParentInfo {
            parent_id,
            arg_key,
            index,
        });
        expr.for_each_child(|role, i, child| self.visit(child, Some(id), role, i));
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&'a Expression> {
        self.nodes.get(id).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&ParentInfo> {
        self.parents.get(id)
    }

    /// Id of a node borrowed from the same tree, by identity
    pub fn id_of(&self, expr: &Expression) -> Option<NodeId> {
        self.nodes.iter().position(|n| std::ptr::eq(*n, expr))
    }

    /// Parent of a node borrowed from the same tree
    pub fn parent(&self, expr: &Expression) -> Option<&'a Expression> {
        let id = self.id_of(expr)?;
        let parent_id = self.parents[id].parent_id?;
        self.node(parent_id)
    }

    /// Role the node occupies in its parent
    pub fn arg_key(&self, expr: &Expression) -> Option<&'static str> {
        let id = self.id_of(expr)?;
        Some(self.parents[id].arg_key).filter(|k| !k.is_empty())
    }

    pub fn depth_of(&self, id: NodeId) -> usize {
        self.ancestors_of(id).len()
    }

    /// Parent, grandparent, ... up to the root
    pub fn ancestors_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = id;
        while let Some(parent_id) = self.parents.get(current).and_then(|p| p.parent_id) {
            ancestors.push(parent_id);
            current = parent_id;
        }
        ancestors
    }

    /// Nearest ancestor matching `predicate`
    pub fn find_ancestor<F>(&self, expr: &Expression, predicate: F) -> Option<&'a Expression>
    where
        F: Fn(&Expression) -> bool,
    {
        let id = self.id_of(expr)?;
        self.ancestors_of(id)
            .into_iter()
            .filter_map(|a| self.node(a))
            .find(|n| predicate(n))
    }
}

fn children_of(expr: &Expression) -> Vec<&Expression> {
    let mut out = Vec::new();
    expr.for_each_child(|_, _, child| out.push(child));
    out
}

/// Pre-order iterator yielding each node with its depth below the start
pub struct DfsIter<'a> {
    stack: Vec<(usize, &'a Expression)>,
}

impl<'a> DfsIter<'a> {
    pub fn new(root: &'a Expression) -> Self {
        Self { stack: vec![(0, root)] }
    }
}

impl<'a> Iterator for DfsIter<'a> {
    type Item = (usize, &'a Expression);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, expr) = self.stack.pop()?;
        // Reverse so children come out in source order
        for child in children_of(expr).into_iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, expr))
    }
}

/// Level-order iterator
pub struct BfsIter<'a> {
    queue: VecDeque<&'a Expression>,
}

impl<'a> BfsIter<'a> {
    pub fn new(root: &'a Expression) -> Self {
        Self {
            queue: VecDeque::from([root]),
        }
    }
}

impl<'a> Iterator for BfsIter<'a> {
    type Item = &'a Expression;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.queue.pop_front()?;
        self.queue.extend(children_of(expr));
        Some(expr)
    }
}

/// Traversal and search methods on [`Expression`].
pub trait ExpressionWalk {
    /// Pre-order walk of this node and all descendants
    fn walk(&self) -> Box<dyn Iterator<Item = &Expression> + '_>;

    /// Pre-order walk yielding `(depth, node)`, the start node at depth 0
    fn walk_with_depth(&self) -> DfsIter<'_>;

    fn bfs(&self) -> BfsIter<'_>;

    fn find<F>(&self, predicate: F) -> Option<&Expression>
    where
        F: Fn(&Expression) -> bool;

    fn find_all<F>(&self, predicate: F) -> Vec<&Expression>
    where
        F: Fn(&Expression) -> bool;

    fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Expression) -> bool;

    fn tree_depth(&self) -> usize;
}

impl ExpressionWalk for Expression {
    fn walk(&self) -> Box<dyn Iterator<Item = &Expression> + '_> {
        Box::new(DfsIter::new(self).map(|(_, e)| e))
    }

    fn walk_with_depth(&self) -> DfsIter<'_> {
        DfsIter::new(self)
    }

    fn bfs(&self) -> BfsIter<'_> {
        BfsIter::new(self)
    }

    fn find<F>(&self, predicate: F) -> Option<&Expression>
    where
        F: Fn(&Expression) -> bool,
    {
        self.walk().find(|e| predicate(e))
    }

    fn find_all<F>(&self, predicate: F) -> Vec<&Expression>
    where
        F: Fn(&Expression) -> bool,
    {
        self.walk().filter(|e| predicate(e)).collect()
    }

    fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Expression) -> bool,
    {
        self.walk().any(|e| predicate(e))
    }

    fn tree_depth(&self) -> usize {
        self.walk_with_depth().map(|(d, _)| d).max().unwrap_or(0)
    }
}

/// Rewrite a tree bottom-up: children first, then `fun` on the rebuilt node.
///
/// ```
/// use sqlshift::expressions::Expression;
/// use sqlshift::traversal::transform;
///
/// let expr = Expression::column("a").eq(Expression::column("b"));
/// let renamed = transform(expr, &mut |e| {
///     Ok(match e {
///         Expression::Column(c) if c.name.name == "a" => Expression::column("x"),
///         other => other,
///     })
/// })
/// .unwrap();
/// assert_eq!(renamed.sql(), "x = b");
/// ```
pub fn transform<F>(mut expr: Expression, fun: &mut F) -> Result<Expression>
where
    F: FnMut(Expression) -> Result<Expression>,
{
    let mut failure = None;
    expr.for_each_child_mut(|_, _, child| {
        if failure.is_some() {
            return;
        }
        match transform(child.take(), fun) {
            Ok(rewritten) => *child = rewritten,
            Err(e) => failure = Some(e),
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }
    fun(expr)
}

pub fn is_column(expr: &Expression) -> bool {
    matches!(expr, Expression::Column(_))
}

pub fn is_subquery(expr: &Expression) -> bool {
    matches!(expr, Expression::Subquery(_))
}

/// All column references under `expr`
pub fn get_columns(expr: &Expression) -> Vec<&Expression> {
    expr.find_all(is_column)
}

/// All table references under `expr`
pub fn get_tables(expr: &Expression) -> Vec<&Expression> {
    expr.find_all(|e| matches!(e, Expression::Table(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::{ExpressionKind, Select};

    fn tree() -> Expression {
        // SELECT a + 1 FROM t WHERE b = 2
        let mut select = Select::new();
        select.add_column(Expression::Add(Box::new(crate::expressions::BinaryOp::new(
            Expression::column("a"),
            Expression::number(1),
        ))));
        select.from.push(Expression::table("t"));
        select.add_where(Expression::column("b").eq(Expression::number(2)));
        Expression::Select(Box::new(select))
    }

    #[test]
    fn test_walk_is_preorder() {
        let t = tree();
        let kinds: Vec<ExpressionKind> = t.walk().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ExpressionKind::Select,
                ExpressionKind::Add,
                ExpressionKind::Column,
                ExpressionKind::Literal,
                ExpressionKind::Table,
                ExpressionKind::Eq,
                ExpressionKind::Column,
                ExpressionKind::Literal,
            ]
        );
    }

    #[test]
    fn test_walk_is_restartable() {
        let t = tree();
        assert_eq!(t.walk().count(), t.walk().count());
    }

    #[test]
    fn test_walk_with_depth() {
        let t = tree();
        let depths: Vec<usize> = t.walk_with_depth().map(|(d, _)| d).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 1, 1, 2, 2]);
        assert_eq!(t.tree_depth(), 2);
    }

    #[test]
    fn test_bfs_order() {
        let t = tree();
        let kinds: Vec<ExpressionKind> = t.bfs().take(4).map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ExpressionKind::Select,
                ExpressionKind::Add,
                ExpressionKind::Table,
                ExpressionKind::Eq
            ]
        );
    }

    #[test]
    fn test_tree_context_parents() {
        let t = tree();
        let ctx = TreeContext::build(&t);
        assert_eq!(ctx.len(), 8);
        assert_eq!(ctx.get(0).and_then(|p| p.parent_id), None);

        let b = t.find(|e| e.name() == Some("b")).unwrap();
        assert_eq!(ctx.parent(b).map(|p| p.kind()), Some(ExpressionKind::Eq));
        assert_eq!(ctx.arg_key(b), Some("this"));

        let id = ctx.id_of(b).unwrap();
        assert_eq!(ctx.depth_of(id), 2);
        let select = ctx.find_ancestor(b, |e| e.kind() == ExpressionKind::Select);
        assert!(select.is_some());
    }

    #[test]
    fn test_context_tracks_list_indices() {
        let t = tree();
        let ctx = TreeContext::build(&t);
        let table = t.find(|e| e.kind() == ExpressionKind::Table).unwrap();
        let info = ctx.get(ctx.id_of(table).unwrap()).unwrap();
        assert_eq!(info.arg_key, "from");
        assert_eq!(info.index, Some(0));
    }

    #[test]
    fn test_context_reflects_reattachment() {
        let mut t = tree();
        // Move the WHERE predicate into the projection list
        let predicate = t.as_select_mut().unwrap().where_.take().unwrap();
        t.as_select_mut().unwrap().add_column(predicate);

        let ctx = TreeContext::build(&t);
        let eq = t.find(|e| e.kind() == ExpressionKind::Eq).unwrap();
        let info = ctx.get(ctx.id_of(eq).unwrap()).unwrap();
        assert_eq!(info.arg_key, "expressions");
        assert_eq!(info.index, Some(1));
    }

    #[test]
    fn test_transform_bottom_up() {
        let t = tree();
        let mut visited = Vec::new();
        let out = transform(t, &mut |e| {
            visited.push(e.kind());
            Ok(match e {
                Expression::Literal(_) => Expression::number(0),
                other => other,
            })
        })
        .unwrap();
        assert_eq!(visited.last(), Some(&ExpressionKind::Select));
        assert_eq!(visited[0], ExpressionKind::Column);
        assert_eq!(out.sql(), "SELECT a + 0 FROM t WHERE b = 0");
    }

    #[test]
    fn test_transform_propagates_errors() {
        let result = transform(tree(), &mut |e| match e {
            Expression::Table(_) => Err(crate::error::Error::internal("boom")),
            other => Ok(other),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_get_columns_and_tables() {
        let t = tree();
        assert_eq!(get_columns(&t).len(), 2);
        assert_eq!(get_tables(&t).len(), 1);
    }
}
