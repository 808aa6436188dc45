//! Arena tree with ancestor navigation.
//!
//! Nodes live in a single vector and refer to their parent by index, so
//! navigation never needs shared ownership. Every navigation step returns
//! `None` when it runs past the root or hits an unknown id.
//!
//! # Example
//!
//! ```
//! use mailroom::builder::BuilderTree;
//!
//! let mut tree = BuilderTree::new("component");
//! let router = tree.add_child(tree.root(), "router");
//! let route = tree.add_child(router, "route");
//!
//! assert_eq!(tree.up(route), Some(router));
//! assert_eq!(tree.up_to(route, |v| *v == "component"), Some(tree.root()));
//! ```

/// Index of a node in a [`BuilderTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    parent: Option<NodeId>,
}

/// A tree of values stored in an arena.
#[derive(Debug, Clone)]
pub struct BuilderTree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> BuilderTree<T> {
    /// Create a tree holding only a root node.
    pub fn new(root: T) -> Self {
        Self {
            nodes: vec![Node {
                value: root,
                parent: None,
            }],
        }
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Add a child under `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: NodeId, value: T) -> NodeId {
        assert!(
            parent.0 < self.nodes.len(),
            "parent node {} is not in the tree",
            parent.0
        );
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent: Some(parent),
        });
        id
    }

    /// Value of a node.
    pub fn value(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0).map(|n| &n.value)
    }

    /// Mutable value of a node.
    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0).map(|n| &mut n.value)
    }

    /// Children of a node, in insertion order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(id))
            .map(|(i, _)| NodeId(i))
    }

    /// Parent of a node.
    pub fn up(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    /// The `levels`-th ancestor. Zero levels count as one, so
    /// `up_levels(id, 0)` is the parent.
    pub fn up_levels(&self, id: NodeId, levels: usize) -> Option<NodeId> {
        let mut current = self.up(id)?;
        for _ in 1..levels {
            current = self.up(current)?;
        }
        Some(current)
    }

    /// Closest strict ancestor whose value satisfies `pred`.
    pub fn up_to<F>(&self, id: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&T) -> bool,
    {
        let mut current = self.up(id)?;
        loop {
            if pred(&self.nodes[current.0].value) {
                return Some(current);
            }
            current = self.up(current)?;
        }
    }

    /// Repeat [`up_to`](Self::up_to) `level` times, each search starting
    /// from the previous match. `level` 0 yields `None`.
    pub fn up_to_nth<F>(&self, id: NodeId, level: usize, pred: F) -> Option<NodeId>
    where
        F: Fn(&T) -> bool,
    {
        if level == 0 {
            return None;
        }
        let mut current = id;
        for _ in 0..level {
            current = self.up_to(current, &pred)?;
        }
        Some(current)
    }

    /// Root reached by walking up from `id`.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?;
        let mut current = id;
        while let Some(parent) = self.up(current) {
            current = parent;
        }
        Some(current)
    }

    /// Ids from the root down to `id`, both included.
    pub fn path_from_root(&self, id: NodeId) -> Option<Vec<NodeId>> {
        self.nodes.get(id.0)?;
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.up(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        Some(path)
    }
}
