use crate::error::TreeError;
use crate::tree::{Node, TupleLeaf};

impl<T> Node<T> {
    /// Leaf-wise map over a single node.
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Node<U> {
        self.map_inner(&mut f)
    }

    /// Fallible leaf-wise map over a single node.
    pub fn try_map<U, F: FnMut(&T) -> Result<U, TreeError>>(
        &self,
        mut f: F,
    ) -> Result<Node<U>, TreeError> {
        self.try_map_inner(&mut f)
    }

    pub(crate) fn map_inner<U>(&self, f: &mut impl FnMut(&T) -> U) -> Node<U> {
        match self {
            Node::Leaf(value) => Node::Leaf(f(value)),
            Node::Group(group) => Node::Group(group.map_inner(f)),
        }
    }

    pub(crate) fn try_map_inner<U>(
        &self,
        f: &mut impl FnMut(&T) -> Result<U, TreeError>,
    ) -> Result<Node<U>, TreeError> {
        match self {
            Node::Leaf(value) => Ok(Node::Leaf(f(value)?)),
            Node::Group(group) => Ok(Node::Group(group.try_map_inner(f)?)),
        }
    }

    fn levels_at(&self, level: usize) -> Node<usize> {
        match self {
            Node::Leaf(_) => Node::Leaf(level),
            Node::Group(group) => Node::Group(group.levels_inner(level + 1)),
        }
    }

    /// Whether this node has the same topology as `other`, ignoring payloads.
    pub fn topology_eq<U>(&self, other: &Node<U>) -> bool {
        match (self, other) {
            (Node::Leaf(_), Node::Leaf(_)) => true,
            (Node::Group(left), Node::Group(right)) => left.topology_eq(right),
            _ => false,
        }
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            Node::Leaf(value) => out.push(value),
            Node::Group(group) => {
                for child in group.iter() {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl<T> TupleLeaf<T> {
    /// Leaf-wise map: rebuilds the tree with every leaf payload replaced by
    /// `f(payload)`. The topology is unchanged.
    ///
    /// This is the primitive underlying all leaf-payload operations.
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> TupleLeaf<U> {
        self.map_inner(&mut f)
    }

    /// Leaf-wise map where `f` can fail; the first error is propagated.
    pub fn try_map<U, F: FnMut(&T) -> Result<U, TreeError>>(
        &self,
        mut f: F,
    ) -> Result<TupleLeaf<U>, TreeError> {
        self.try_map_inner(&mut f)
    }

    fn map_inner<U>(&self, f: &mut impl FnMut(&T) -> U) -> TupleLeaf<U> {
        self.iter().map(|node| node.map_inner(f)).collect()
    }

    fn try_map_inner<U>(
        &self,
        f: &mut impl FnMut(&T) -> Result<U, TreeError>,
    ) -> Result<TupleLeaf<U>, TreeError> {
        self.iter().map(|node| node.try_map_inner(f)).collect()
    }

    /// Replaces every leaf with its nesting depth; row leaves are level 0.
    ///
    /// The level tree is a cheap topology fingerprint: two trees are
    /// topology-equal iff their level trees are value-equal.
    pub fn levels(&self) -> TupleLeaf<usize> {
        self.levels_inner(0)
    }

    /// Like [`levels`](Self::levels) with a configurable start level.
    pub fn levels_from(&self, start: usize) -> TupleLeaf<usize> {
        self.levels_inner(start)
    }

    fn levels_inner(&self, level: usize) -> TupleLeaf<usize> {
        self.iter().map(|node| node.levels_at(level)).collect()
    }

    /// Whether this tree has the same topology as `other`, ignoring payloads.
    pub fn topology_eq<U>(&self, other: &TupleLeaf<U>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(left, right)| left.topology_eq(right))
    }

    /// Whether no row is itself a group.
    pub fn is_flat(&self) -> bool {
        self.iter().all(Node::is_leaf)
    }

    /// References to all leaf payloads in left-to-right order.
    pub fn leaf_values(&self) -> Vec<&T> {
        let mut out = Vec::new();
        for node in self.iter() {
            node.collect_leaves(&mut out);
        }
        out
    }

    /// A single-level tree of all leaves in left-to-right order. Idempotent.
    pub fn flatten(&self) -> TupleLeaf<T>
    where
        T: Clone,
    {
        TupleLeaf::from_leaves(self.leaf_values().into_iter().cloned())
    }

    /// Whether every row equals the first.
    pub fn all_equal(&self) -> bool
    where
        T: PartialEq,
    {
        match self.rows().split_first() {
            None => true,
            Some((first, rest)) => rest.iter().all(|row| row == first),
        }
    }

    /// The first row if every row equals it, else `None`.
    pub fn get_if_all_equal(&self) -> Option<&Node<T>>
    where
        T: PartialEq,
    {
        if self.all_equal() {
            self.rows().first()
        } else {
            None
        }
    }

    /// Reduces the rows into one node of the first row's topology.
    ///
    /// The first row is the initial accumulator; every later row is combined
    /// leaf-by-leaf, by position. All rows must share one topology.
    ///
    /// ```
    /// use tupleleaf::{tuplefy, Node};
    ///
    /// let rows = tuplefy![1, [2, 3], 4].repeat(3);
    /// let summed = rows.reduce(|acc, x| acc + x).unwrap();
    /// assert_eq!(summed, Node::from(tuplefy![3, [6, 9], 12]));
    /// ```
    pub fn reduce<F>(&self, f: F) -> Result<Node<T>, TreeError>
    where
        T: Clone,
        F: FnMut(T, &T) -> T,
    {
        self.reduce_with(T::clone, f)
    }

    /// Like [`reduce`](Self::reduce), but the accumulator is seeded by
    /// applying `seed` leaf-wise to the first row.
    pub fn reduce_with<A, S, F>(&self, seed: S, mut f: F) -> Result<Node<A>, TreeError>
    where
        S: FnMut(&T) -> A,
        F: FnMut(A, &T) -> A,
    {
        let (first, rest) = self.rows().split_first().ok_or_else(|| {
            TreeError::TopologyMismatch("cannot reduce an empty tree".to_string())
        })?;
        for row in rest.iter() {
            if !first.topology_eq(row) {
                return Err(TreeError::TopologyMismatch(
                    "rows do not share one topology, so leaves cannot be paired".to_string(),
                ));
            }
        }

        let mut acc = first.map(seed);
        for row in rest.iter() {
            acc = reduce_node(acc, row, &mut f);
        }
        Ok(acc)
    }

    /// Transposes the rows: every leaf position becomes the ordered list of
    /// its values across the rows. Inverse of [`unzip_leaf`].
    ///
    /// `((a1, (a2, a3)), (b1, (b2, b3)))` becomes
    /// `([a1, b1], ([a2, b2], [a3, b3]))`.
    ///
    /// [`unzip_leaf`]: TupleLeaf::unzip_leaf
    pub fn zip_leaf(&self) -> Result<Node<Vec<T>>, TreeError>
    where
        T: Clone,
    {
        self.reduce_with(
            |leaf| vec![leaf.clone()],
            |mut acc, leaf| {
                acc.push(leaf.clone());
                acc
            },
        )
    }
}

fn reduce_node<A, T>(acc: Node<A>, row: &Node<T>, f: &mut impl FnMut(A, &T) -> A) -> Node<A> {
    match (acc, row) {
        (Node::Leaf(acc), Node::Leaf(value)) => Node::Leaf(f(acc, value)),
        (Node::Group(acc), Node::Group(row)) => Node::Group(
            acc.into_nodes()
                .into_iter()
                .zip(row.iter())
                .map(|(acc, value)| reduce_node(acc, value, f))
                .collect(),
        ),
        // Rows are checked pairwise topology-equal before reduction starts.
        _ => unreachable!("reduce called on rows with mismatched topology"),
    }
}

impl<T: Clone> Node<Vec<T>> {
    /// Inverse of [`TupleLeaf::zip_leaf`]: a node whose leaves are lists of
    /// uniform length N yields N rows of the inner topology.
    pub fn unzip_leaf(&self) -> Result<TupleLeaf<T>, TreeError> {
        match self {
            Node::Leaf(values) => Ok(TupleLeaf::from_leaves(values.iter().cloned())),
            Node::Group(group) => group.unzip_leaf(),
        }
    }
}

impl<T: Clone> TupleLeaf<Vec<T>> {
    /// Inverse of [`zip_leaf`](TupleLeaf::zip_leaf): recursively transposes a
    /// tree of uniform-length lists back into its rows.
    pub fn unzip_leaf(&self) -> Result<TupleLeaf<T>, TreeError> {
        let per_child: Vec<TupleLeaf<T>> = self
            .iter()
            .map(Node::unzip_leaf)
            .collect::<Result<_, _>>()?;
        let count = per_child.first().map(TupleLeaf::len).unwrap_or(0);
        for child in per_child.iter() {
            if child.len() != count {
                return Err(TreeError::TopologyMismatch(
                    "zipped leaves have different lengths".to_string(),
                ));
            }
        }

        Ok((0..count)
            .map(|row| {
                Node::Group(
                    per_child
                        .iter()
                        .map(|child| child.rows()[row].clone())
                        .collect(),
                )
            })
            .collect())
    }
}

impl TupleLeaf<bool> {
    /// Whether every leaf is true. The tree must be flat.
    pub fn all(&self) -> Result<bool, TreeError> {
        if !self.is_flat() {
            return Err(TreeError::TopologyMismatch(
                "`all` needs a flat tree".to_string(),
            ));
        }
        Ok(self.iter().all(|node| matches!(node, Node::Leaf(true))))
    }
}
