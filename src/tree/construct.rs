use crate::tree::{Node, TupleLeaf};

/// Construction input for [`tuplefy`]: a raw value, a convertible sequence,
/// or an already-converted subtree.
///
/// This is the typed rendition of "arbitrarily nested native sequences":
/// every `Seq` becomes a group node, every `Value` becomes a leaf, and a
/// `Tree` is spliced in as-is, so converting an already-converted tree is a
/// no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    /// A leaf payload.
    Value(T),
    /// A sequence converted into a group node.
    Seq(Vec<Nested<T>>),
    /// An already-converted subtree, kept as-is.
    Tree(Node<T>),
}

impl<T> From<T> for Nested<T> {
    fn from(value: T) -> Self {
        Nested::Value(value)
    }
}

impl<T> From<Vec<Nested<T>>> for Nested<T> {
    fn from(seq: Vec<Nested<T>>) -> Self {
        Nested::Seq(seq)
    }
}

impl<T> From<Node<T>> for Nested<T> {
    fn from(node: Node<T>) -> Self {
        Nested::Tree(node)
    }
}

impl<T> From<TupleLeaf<T>> for Nested<T> {
    fn from(tree: TupleLeaf<T>) -> Self {
        Nested::Tree(Node::Group(tree))
    }
}

fn node_from_nested<T>(nested: Nested<T>) -> Node<T> {
    match nested {
        Nested::Value(value) => Node::Leaf(value),
        Nested::Seq(children) => {
            Node::Group(children.into_iter().map(node_from_nested).collect())
        }
        Nested::Tree(node) => node,
    }
}

/// Builds a [`TupleLeaf`] tree from one or more nested values.
///
/// If exactly one value is given and it is a sequence or an already-converted
/// group, its elements become the root's children directly; otherwise all
/// given values become the root's children. Conversion is idempotent:
/// feeding a converted tree back in returns an equal tree.
///
/// ```
/// use tupleleaf::{tuplefy, Nested};
///
/// let tree = tuplefy([Nested::from(vec![
///     Nested::from(1),
///     Nested::from(vec![Nested::from(2), Nested::from(3)]),
///     Nested::from(4),
/// ])]);
/// assert_eq!(tree, tuplefy![1, [2, 3], 4]);
/// assert_eq!(tuplefy([Nested::from(tree.clone())]), tree);
/// ```
pub fn tuplefy<T>(values: impl IntoIterator<Item = Nested<T>>) -> TupleLeaf<T> {
    let mut values: Vec<Nested<T>> = values.into_iter().collect();
    if values.len() == 1 {
        return match values.remove(0) {
            Nested::Seq(children) => children.into_iter().map(node_from_nested).collect(),
            Nested::Tree(Node::Group(group)) => group,
            single => TupleLeaf::from_nodes(vec![node_from_nested(single)]),
        };
    }
    values.into_iter().map(node_from_nested).collect()
}

/// Builds a [`TupleLeaf`] literal; brackets denote nested groups.
///
/// ```
/// use tupleleaf::tuplefy;
///
/// let tree = tuplefy![1, [2, [3, 4]], 5];
/// assert_eq!(tree.flatten(), tuplefy![1, 2, 3, 4, 5]);
/// ```
#[macro_export]
macro_rules! tuplefy {
    () => {
        $crate::TupleLeaf::new()
    };
    ($($tt:tt)+) => {
        $crate::TupleLeaf::from_nodes($crate::__tuplefy_nodes!([] $($tt)+))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __tuplefy_nodes {
    ([$($acc:expr,)*] [$($inner:tt)*], $($rest:tt)+) => {
        $crate::__tuplefy_nodes!([$($acc,)* $crate::Node::Group($crate::tuplefy![$($inner)*]),] $($rest)+)
    };
    ([$($acc:expr,)*] [$($inner:tt)*] $(,)?) => {
        vec![$($acc,)* $crate::Node::Group($crate::tuplefy![$($inner)*])]
    };
    ([$($acc:expr,)*] $leaf:expr, $($rest:tt)+) => {
        $crate::__tuplefy_nodes!([$($acc,)* $crate::Node::Leaf($leaf),] $($rest)+)
    };
    ([$($acc:expr,)*] $leaf:expr $(,)?) => {
        vec![$($acc,)* $crate::Node::Leaf($leaf)]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_values_become_root_children() {
        let tree = tuplefy([Nested::from(1), Nested::from(2)]);
        assert_eq!(tree, tuplefy![1, 2]);
    }

    #[test]
    fn single_value_becomes_single_leaf() {
        let tree = tuplefy([Nested::from(1)]);
        assert_eq!(tree, tuplefy![1]);
    }

    #[test]
    fn single_sequence_is_unwrapped_to_root_children() {
        let tree = tuplefy([Nested::from(vec![Nested::from(1), Nested::from(2)])]);
        assert_eq!(tree, tuplefy![1, 2]);
    }

    #[test]
    fn construction_is_idempotent() {
        let tree = tuplefy![1, [2, [3, 4]]];
        assert_eq!(tuplefy([Nested::from(tree.clone())]), tree);
    }

    #[test]
    fn subtree_arguments_are_spliced_as_is() {
        let inner = tuplefy![2, 3];
        let tree = tuplefy([Nested::from(1), Nested::from(Node::Group(inner))]);
        assert_eq!(tree, tuplefy![1, [2, 3]]);
    }

    #[test]
    fn macro_handles_empty_and_trailing_commas() {
        let empty: TupleLeaf<i32> = tuplefy![];
        assert_eq!(empty, TupleLeaf::new());
        assert_eq!(tuplefy![1, [2, 3],], tuplefy![1, [2, 3]]);
        let nested_empty: TupleLeaf<i32> = tuplefy![[]];
        assert_eq!(
            nested_empty,
            TupleLeaf::from_nodes(vec![Node::Group(TupleLeaf::new())])
        );
    }
}
