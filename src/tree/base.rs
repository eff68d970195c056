use serde::{Deserialize, Serialize};
use std::ops::{Add, Index};

/// A node in a [`TupleLeaf`] tree: either a leaf payload or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node<T> {
    /// A terminal node holding an opaque payload value.
    Leaf(T),
    /// An internal node holding an ordered sequence of children.
    Group(TupleLeaf<T>),
}

impl<T> Node<T> {
    /// Whether the node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the payload if the node is a leaf.
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Group(_) => None,
        }
    }

    /// Returns the children if the node is a group.
    pub fn as_group(&self) -> Option<&TupleLeaf<T>> {
        match self {
            Node::Leaf(_) => None,
            Node::Group(group) => Some(group),
        }
    }
}

impl<T> From<T> for Node<T> {
    fn from(value: T) -> Self {
        Node::Leaf(value)
    }
}

impl<T> From<TupleLeaf<T>> for Node<T> {
    fn from(group: TupleLeaf<T>) -> Self {
        Node::Group(group)
    }
}

/// An ordered, immutable group of [`Node`]s with tuple semantics.
///
/// This is the group node of the tree: value equality is structural, `+`
/// concatenates the children of both operands, and the tree is hashable
/// whenever its leaves are. The top-level children are called *rows* and are
/// the unit of iteration for reduce, zip, cat and stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleLeaf<T> {
    children: Vec<Node<T>>,
}

impl<T> TupleLeaf<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// Creates a tree from its children.
    pub fn from_nodes(children: Vec<Node<T>>) -> Self {
        Self { children }
    }

    /// Creates a flat tree where every value becomes a leaf row.
    pub fn from_leaves(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            children: values.into_iter().map(Node::Leaf).collect(),
        }
    }

    /// The top-level children.
    pub fn rows(&self) -> &[Node<T>] {
        &self.children
    }

    /// Consumes the tree, returning its children.
    pub fn into_nodes(self) -> Vec<Node<T>> {
        self.children
    }

    /// The number of top-level children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the tree has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates over the top-level children.
    pub fn iter(&self) -> std::slice::Iter<'_, Node<T>> {
        self.children.iter()
    }

    /// A group containing `times` copies of this tree.
    pub fn repeat(&self, times: usize) -> TupleLeaf<T>
    where
        T: Clone,
    {
        Self {
            children: vec![Node::Group(self.clone()); times],
        }
    }
}

impl<T> Default for TupleLeaf<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for TupleLeaf<T> {
    type Output = Node<T>;

    fn index(&self, index: usize) -> &Node<T> {
        &self.children[index]
    }
}

impl<T> Add for TupleLeaf<T> {
    type Output = TupleLeaf<T>;

    fn add(mut self, other: TupleLeaf<T>) -> TupleLeaf<T> {
        self.children.extend(other.children);
        self
    }
}

impl<T> FromIterator<Node<T>> for TupleLeaf<T> {
    fn from_iter<I: IntoIterator<Item = Node<T>>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for TupleLeaf<T> {
    type Item = Node<T>;
    type IntoIter = std::vec::IntoIter<Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a TupleLeaf<T> {
    type Item = &'a Node<T>;
    type IntoIter = std::slice::Iter<'a, Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}
