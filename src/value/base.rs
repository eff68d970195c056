use crate::error::TreeError;
use crate::value::{ArrayData, DType, RowIndex, Shape, TensorData};
use serde::{Deserialize, Serialize};

/// A leaf payload the numeric operations understand.
///
/// Dispatch between the two array representations (and the bare shape
/// descriptor) is explicit variant matching; payload operations reject the
/// variants they do not support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A plain array payload.
    Array(ArrayData),
    /// A tensor payload with device placement and gradient tracking.
    Tensor(TensorData),
    /// A bare shape descriptor payload.
    Shape(Shape),
}

/// The runtime representation of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// The array representation.
    Array,
    /// The tensor representation.
    Tensor,
    /// A bare shape descriptor.
    Shape,
}

impl Value {
    /// The representation of this payload.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Array(_) => ValueKind::Array,
            Value::Tensor(_) => ValueKind::Tensor,
            Value::Shape(_) => ValueKind::Shape,
        }
    }

    /// The shape of the payload; shape descriptors have no shape themselves.
    pub fn shape(&self) -> Result<Shape, TreeError> {
        match self {
            Value::Array(array) => Ok(array.shape.clone()),
            Value::Tensor(tensor) => Ok(tensor.shape().clone()),
            Value::Shape(_) => Err(TreeError::UnsupportedPayload {
                op: "shapes",
                kind: ValueKind::Shape,
            }),
        }
    }

    /// The length of the payload: the batch dimension for arrays and
    /// tensors, the number of dimensions for a shape descriptor.
    pub fn len(&self) -> Result<usize, TreeError> {
        match self {
            Value::Array(array) => array.len().ok_or(TreeError::UnsupportedPayload {
                op: "lens",
                kind: ValueKind::Array,
            }),
            Value::Tensor(tensor) => tensor.len().ok_or(TreeError::UnsupportedPayload {
                op: "lens",
                kind: ValueKind::Tensor,
            }),
            Value::Shape(shape) => Ok(shape.num_dims()),
        }
    }

    /// The dtype of the payload's elements.
    pub fn dtype(&self) -> Result<DType, TreeError> {
        match self {
            Value::Array(array) => Ok(array.dtype()),
            Value::Tensor(tensor) => Ok(tensor.dtype()),
            Value::Shape(_) => Err(TreeError::UnsupportedPayload {
                op: "dtypes",
                kind: ValueKind::Shape,
            }),
        }
    }

    /// Applies a row index along dim 0.
    pub fn select(&self, index: &RowIndex) -> Result<Value, TreeError> {
        match self {
            Value::Array(array) => Ok(Value::Array(array.select(index)?)),
            Value::Tensor(tensor) => Ok(Value::Tensor(tensor.select(index)?)),
            Value::Shape(_) => Err(TreeError::UnsupportedPayload {
                op: "iloc",
                kind: ValueKind::Shape,
            }),
        }
    }
}

impl From<ArrayData> for Value {
    fn from(array: ArrayData) -> Self {
        Value::Array(array)
    }
}

impl From<TensorData> for Value {
    fn from(tensor: TensorData) -> Self {
        Value::Tensor(tensor)
    }
}

impl From<Shape> for Value {
    fn from(shape: Shape) -> Self {
        Value::Shape(shape)
    }
}
