use crate::error::TreeError;
use crate::tree::{Node, TupleLeaf};
use crate::value::{ArrayData, DType, Device, Shape, TensorData, Value, ValueKind};

fn as_arrays(values: &[Value]) -> Result<Vec<&ArrayData>, TreeError> {
    values
        .iter()
        .map(|value| match value {
            Value::Array(array) => Ok(array),
            other => Err(TreeError::InconsistentType {
                expected: ValueKind::Array,
                found: other.kind(),
            }),
        })
        .collect()
}

fn as_tensors(values: &[Value]) -> Result<Vec<&TensorData>, TreeError> {
    values
        .iter()
        .map(|value| match value {
            Value::Tensor(tensor) => Ok(tensor),
            other => Err(TreeError::InconsistentType {
                expected: ValueKind::Tensor,
                found: other.kind(),
            }),
        })
        .collect()
}

impl TupleLeaf<Value> {
    /// Leaf-wise shape introspection.
    pub fn shapes(&self) -> Result<TupleLeaf<Shape>, TreeError> {
        self.try_map(Value::shape)
    }

    /// Leaf-wise length introspection along dim 0.
    pub fn lens(&self) -> Result<TupleLeaf<usize>, TreeError> {
        self.try_map(Value::len)
    }

    /// Leaf-wise dtype introspection.
    pub fn dtypes(&self) -> Result<TupleLeaf<DType>, TreeError> {
        self.try_map(Value::dtype)
    }

    /// Leaf-wise payload representation.
    pub fn kinds(&self) -> TupleLeaf<ValueKind> {
        self.map(Value::kind)
    }

    /// The single representation shared by all leaves.
    pub fn kind(&self) -> Result<ValueKind, TreeError> {
        let kinds = self.kinds();
        let leaves = kinds.leaf_values();
        let first = **leaves.first().ok_or_else(|| {
            TreeError::TopologyMismatch("cannot take the kind of an empty tree".to_string())
        })?;
        for kind in leaves.iter() {
            if **kind != first {
                return Err(TreeError::InconsistentType {
                    expected: first,
                    found: **kind,
                });
            }
        }
        Ok(first)
    }

    /// Leaf-wise dtype cast. Only array and tensor payloads can be cast.
    pub fn astype(&self, dtype: DType) -> Result<TupleLeaf<Value>, TreeError> {
        self.try_map(|value| match value {
            Value::Array(array) => Ok(Value::Array(array.cast(dtype))),
            Value::Tensor(tensor) => Ok(Value::Tensor(tensor.cast(dtype))),
            Value::Shape(_) => Err(TreeError::UnsupportedPayload {
                op: "astype",
                kind: ValueKind::Shape,
            }),
        })
    }

    /// Converts every array leaf to the tensor representation on the CPU.
    /// A tree that is already uniformly tensors is returned unchanged.
    pub fn to_tensor(&self) -> Result<TupleLeaf<Value>, TreeError> {
        match self.kind()? {
            ValueKind::Tensor => Ok(self.clone()),
            ValueKind::Array => self.try_map(|value| match value {
                Value::Array(array) => {
                    Ok(Value::Tensor(TensorData::from_array(array.clone())))
                }
                other => Err(TreeError::UnsupportedPayload {
                    op: "to_tensor",
                    kind: other.kind(),
                }),
            }),
            ValueKind::Shape => Err(TreeError::UnsupportedPayload {
                op: "to_tensor",
                kind: ValueKind::Shape,
            }),
        }
    }

    /// Converts every tensor leaf to the array representation, detaching it
    /// from gradient tracking first. A bare shape descriptor converts to a
    /// 1-D I64 array of its dimensions. A tree that is already uniformly
    /// arrays is returned unchanged.
    pub fn to_array(&self) -> Result<TupleLeaf<Value>, TreeError> {
        match self.kind()? {
            ValueKind::Array => Ok(self.clone()),
            _ => self.try_map(|value| match value {
                Value::Array(array) => Ok(Value::Array(array.clone())),
                Value::Tensor(tensor) => Ok(Value::Array(tensor.detach().data)),
                Value::Shape(shape) => {
                    let dims: Vec<i64> = shape.dims.iter().map(|&dim| dim as i64).collect();
                    let len = dims.len();
                    Ok(Value::Array(ArrayData::from_vec(dims, [len])))
                }
            }),
        }
    }

    /// Moves every tensor leaf to `device`. Only tensors live on devices.
    pub fn to_device(&self, device: Device) -> Result<TupleLeaf<Value>, TreeError> {
        self.try_map(|value| match value {
            Value::Tensor(tensor) => Ok(Value::Tensor(tensor.to_device(device))),
            other => Err(TreeError::UnsupportedPayload {
                op: "to_device",
                kind: other.kind(),
            }),
        })
    }

    /// Concatenates the rows leaf-by-leaf along dim 0.
    ///
    /// Every row's leaf shapes must agree on all dims except the first; the
    /// result has the first row's topology with dim-0 lengths summed.
    pub fn cat(&self, dim: usize) -> Result<Node<Value>, TreeError> {
        if dim != 0 {
            return Err(TreeError::NotImplementedDim(dim));
        }
        if !self.shapes()?.map(Shape::tail).all_equal() {
            return Err(TreeError::TopologyMismatch(
                "shapes of concatenated leaves must match on all dims except 0".to_string(),
            ));
        }

        let kind = self.kind()?;
        let zipped = self.zip_leaf()?;
        match kind {
            ValueKind::Array => zipped.try_map(|values| {
                Ok(Value::Array(ArrayData::cat(&as_arrays(values)?)?))
            }),
            ValueKind::Tensor => zipped.try_map(|values| {
                Ok(Value::Tensor(TensorData::cat(&as_tensors(values)?)?))
            }),
            ValueKind::Shape => Err(TreeError::UnsupportedPayload {
                op: "cat",
                kind: ValueKind::Shape,
            }),
        }
    }

    /// Stacks the rows leaf-by-leaf along a new leading dim 0.
    ///
    /// Full shape equality across rows is required. Only the tensor
    /// representation supports stacking.
    pub fn stack(&self, dim: usize) -> Result<Node<Value>, TreeError> {
        if dim != 0 {
            return Err(TreeError::NotImplementedDim(dim));
        }
        if !self.shapes()?.all_equal() {
            return Err(TreeError::TopologyMismatch(
                "shapes of stacked leaves must be fully equal".to_string(),
            ));
        }

        let kind = self.kind()?;
        match kind {
            ValueKind::Tensor => {
                let zipped = self.zip_leaf()?;
                zipped.try_map(|values| {
                    Ok(Value::Tensor(TensorData::stack(&as_tensors(values)?)?))
                })
            }
            other => Err(TreeError::UnsupportedPayload {
                op: "stack",
                kind: other,
            }),
        }
    }

    /// Splits every leaf along dim 0 into chunks of `split_size` rows and
    /// regroups the chunks into sibling trees. Tensor payloads only.
    pub fn split(&self, split_size: usize, dim: usize) -> Result<TupleLeaf<Value>, TreeError> {
        if dim != 0 {
            return Err(TreeError::NotImplementedDim(dim));
        }
        match self.kind()? {
            ValueKind::Tensor => {}
            other => {
                return Err(TreeError::UnsupportedPayload {
                    op: "split",
                    kind: other,
                })
            }
        }

        let chunks: TupleLeaf<Vec<Value>> = self.try_map(|value| match value {
            Value::Tensor(tensor) => Ok(tensor
                .split(split_size)?
                .into_iter()
                .map(Value::Tensor)
                .collect()),
            other => Err(TreeError::UnsupportedPayload {
                op: "split",
                kind: other.kind(),
            }),
        })?;
        chunks.unzip_leaf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuplefy;

    fn array(rows: usize, cols: usize, offset: f32) -> Value {
        let values: Vec<f32> = (0..rows * cols).map(|v| v as f32 + offset).collect();
        Value::Array(ArrayData::from_vec(values, [rows, cols]))
    }

    fn tensor(rows: usize, cols: usize, offset: f32) -> Value {
        match array(rows, cols, offset) {
            Value::Array(data) => Value::Tensor(TensorData::from_array(data)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn cat_sums_batch_dims_per_leaf() {
        let rows = tuplefy![[array(4, 5, 0.0)], [array(4, 5, 100.0)]];
        let merged = rows.cat(0).unwrap();
        let merged = match merged {
            Node::Group(group) => group,
            Node::Leaf(_) => unreachable!(),
        };
        assert_eq!(merged.shapes().unwrap(), tuplefy![Shape::from([8, 5])]);
    }

    #[test]
    fn cat_rejects_other_dims() {
        let rows = tuplefy![[array(2, 2, 0.0)], [array(2, 2, 0.0)]];
        assert_eq!(rows.cat(1), Err(TreeError::NotImplementedDim(1)));
    }

    #[test]
    fn cat_rejects_mismatched_row_shapes() {
        let rows = tuplefy![[array(2, 2, 0.0)], [array(2, 3, 0.0)]];
        assert!(matches!(rows.cat(0), Err(TreeError::TopologyMismatch(_))));
    }

    #[test]
    fn stack_requires_tensors() {
        let rows = tuplefy![[array(2, 2, 0.0)], [array(2, 2, 0.0)]];
        assert_eq!(
            rows.stack(0),
            Err(TreeError::UnsupportedPayload {
                op: "stack",
                kind: ValueKind::Array,
            })
        );
    }

    #[test]
    fn stack_adds_leading_dim_per_leaf() {
        let rows = tuplefy![[tensor(2, 3, 0.0)], [tensor(2, 3, 10.0)]];
        let stacked = rows.stack(0).unwrap();
        let stacked = match stacked {
            Node::Group(group) => group,
            Node::Leaf(_) => unreachable!(),
        };
        assert_eq!(stacked.shapes().unwrap(), tuplefy![Shape::from([2, 2, 3])]);
    }

    #[test]
    fn split_regroups_chunks_as_siblings() {
        let tree = tuplefy![tensor(5, 2, 0.0), [tensor(5, 3, 0.0)]];
        let splitted = tree.split(2, 0).unwrap();
        assert_eq!(splitted.len(), 3);
        let last = match &splitted[2] {
            Node::Group(group) => group.clone(),
            Node::Leaf(_) => unreachable!(),
        };
        assert_eq!(
            last.shapes().unwrap(),
            tuplefy![Shape::from([1, 2]), [Shape::from([1, 3])]]
        );
    }

    #[test]
    fn split_requires_tensors_and_dim_zero() {
        let tree = tuplefy![array(4, 2, 0.0)];
        assert_eq!(
            tree.split(2, 0),
            Err(TreeError::UnsupportedPayload {
                op: "split",
                kind: ValueKind::Array,
            })
        );
        let tree = tuplefy![tensor(4, 2, 0.0)];
        assert_eq!(tree.split(2, 1), Err(TreeError::NotImplementedDim(1)));
        assert_eq!(tree.split(0, 0), Err(TreeError::ZeroSplitSize));
    }

    #[test]
    fn kind_rejects_mixed_leaves() {
        let tree = tuplefy![array(2, 2, 0.0), tensor(2, 2, 0.0)];
        assert_eq!(
            tree.kind(),
            Err(TreeError::InconsistentType {
                expected: ValueKind::Array,
                found: ValueKind::Tensor,
            })
        );
    }

    #[test]
    fn astype_rejects_shape_payloads() {
        let tree = tuplefy![Value::Shape(Shape::from([2, 2]))];
        assert_eq!(
            tree.astype(DType::F64),
            Err(TreeError::UnsupportedPayload {
                op: "astype",
                kind: ValueKind::Shape,
            })
        );
    }

    #[test]
    fn astype_casts_every_leaf() {
        let tree = tuplefy![array(2, 2, 0.0), [tensor(2, 2, 0.0)]];
        let casted = tree.astype(DType::I64).unwrap();
        assert_eq!(
            casted.dtypes().unwrap(),
            tuplefy![DType::I64, [DType::I64]]
        );
    }

    #[test]
    fn to_tensor_and_back() {
        let tree = tuplefy![array(2, 2, 0.0), [array(3, 1, 0.0)]];
        let tensors = tree.to_tensor().unwrap();
        assert_eq!(tensors.kind().unwrap(), ValueKind::Tensor);
        // Converting again is a no-op.
        assert_eq!(tensors.to_tensor().unwrap(), tensors);
        assert_eq!(tensors.to_array().unwrap(), tree);
    }

    #[test]
    fn to_array_converts_shape_descriptors() {
        let tree = tuplefy![Value::Shape(Shape::from([4, 5]))];
        let arrays = tree.to_array().unwrap();
        let expected: Value = ArrayData::from_vec(vec![4i64, 5], [2]).into();
        assert_eq!(arrays, tuplefy![expected]);
    }

    #[test]
    fn to_array_detaches_tensors() {
        let tracked = match tensor(2, 2, 0.0) {
            Value::Tensor(mut tensor) => {
                tensor.requires_grad = true;
                Value::Tensor(tensor)
            }
            _ => unreachable!(),
        };
        let tree = tuplefy![tracked];
        assert_eq!(tree.to_array().unwrap().kind().unwrap(), ValueKind::Array);
    }

    #[test]
    fn to_device_moves_tensors_only() {
        let tree = tuplefy![tensor(2, 2, 0.0)];
        let moved = tree.to_device(Device::Cuda(0)).unwrap();
        match &moved[0] {
            Node::Leaf(Value::Tensor(tensor)) => assert_eq!(tensor.device, Device::Cuda(0)),
            _ => unreachable!(),
        }
        let arrays = tuplefy![array(2, 2, 0.0)];
        assert!(matches!(
            arrays.to_device(Device::Cpu),
            Err(TreeError::UnsupportedPayload { op: "to_device", .. })
        ));
    }
}
