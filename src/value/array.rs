use crate::error::TreeError;
use crate::value::{DType, Element, RowIndex, Shape, ValueKind};
use serde::{Deserialize, Serialize};

/// Row-major element storage, one variant per dtype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Buffer {
    /// 32-bit floats.
    F32(Vec<f32>),
    /// 64-bit floats.
    F64(Vec<f64>),
    /// 32-bit signed integers.
    I32(Vec<i32>),
    /// 64-bit signed integers.
    I64(Vec<i64>),
    /// Booleans.
    Bool(Vec<bool>),
}

/// Rebuilds a buffer of the same variant from a transformed element vector.
macro_rules! map_buffer {
    ($buffer:expr, $values:ident => $body:expr) => {
        match $buffer {
            Buffer::F32($values) => Buffer::F32($body),
            Buffer::F64($values) => Buffer::F64($body),
            Buffer::I32($values) => Buffer::I32($body),
            Buffer::I64($values) => Buffer::I64($body),
            Buffer::Bool($values) => Buffer::Bool($body),
        }
    };
}

impl Buffer {
    /// The dtype of the stored elements.
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
            Buffer::I32(_) => DType::I32,
            Buffer::I64(_) => DType::I64,
            Buffer::Bool(_) => DType::Bool,
        }
    }

    /// The number of stored elements.
    pub fn num_elements(&self) -> usize {
        match self {
            Buffer::F32(values) => values.len(),
            Buffer::F64(values) => values.len(),
            Buffer::I32(values) => values.len(),
            Buffer::I64(values) => values.len(),
            Buffer::Bool(values) => values.len(),
        }
    }

    /// Casts the elements to another dtype through f64.
    pub fn cast(&self, dtype: DType) -> Buffer {
        if self.dtype() == dtype {
            return self.clone();
        }
        let values = self.to_f64_vec();
        match dtype {
            DType::F32 => Buffer::F32(values.into_iter().map(f32::from_f64).collect()),
            DType::F64 => Buffer::F64(values),
            DType::I32 => Buffer::I32(values.into_iter().map(i32::from_f64).collect()),
            DType::I64 => Buffer::I64(values.into_iter().map(i64::from_f64).collect()),
            DType::Bool => Buffer::Bool(values.into_iter().map(bool::from_f64).collect()),
        }
    }

    /// The elements converted to f64, in storage order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Buffer::F32(values) => values.iter().map(|v| v.to_f64()).collect(),
            Buffer::F64(values) => values.clone(),
            Buffer::I32(values) => values.iter().map(|v| v.to_f64()).collect(),
            Buffer::I64(values) => values.iter().map(|v| v.to_f64()).collect(),
            Buffer::Bool(values) => values.iter().map(|v| v.to_f64()).collect(),
        }
    }

    fn slice(&self, start: usize, end: usize) -> Buffer {
        map_buffer!(self, values => values[start..end].to_vec())
    }

    fn gather_rows(&self, indices: &[usize], row_elements: usize) -> Buffer {
        map_buffer!(self, values => {
            let mut out = Vec::with_capacity(indices.len() * row_elements);
            for &index in indices {
                out.extend_from_slice(&values[index * row_elements..(index + 1) * row_elements]);
            }
            out
        })
    }

    fn extend(&mut self, other: &Buffer) -> Result<(), TreeError> {
        match (&mut *self, other) {
            (Buffer::F32(acc), Buffer::F32(values)) => acc.extend_from_slice(values),
            (Buffer::F64(acc), Buffer::F64(values)) => acc.extend_from_slice(values),
            (Buffer::I32(acc), Buffer::I32(values)) => acc.extend_from_slice(values),
            (Buffer::I64(acc), Buffer::I64(values)) => acc.extend_from_slice(values),
            (Buffer::Bool(acc), Buffer::Bool(values)) => acc.extend_from_slice(values),
            (acc, other) => {
                return Err(TreeError::DTypeMismatch {
                    expected: acc.dtype(),
                    found: other.dtype(),
                })
            }
        }
        Ok(())
    }
}

/// A dense row-major array payload: the "array-like" representation.
#[derive(new, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayData {
    /// Element storage; `buffer.num_elements() == shape.num_elements()`.
    pub buffer: Buffer,
    /// The shape, outermost dimension first.
    pub shape: Shape,
}

impl ArrayData {
    /// Creates an array from a flat element vector and a shape.
    pub fn from_vec<E: Element, S: Into<Shape>>(values: Vec<E>, shape: S) -> Self {
        Self {
            buffer: E::into_buffer(values),
            shape: shape.into(),
        }
    }

    /// The dtype of the elements.
    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    /// The length of the batch dimension, or `None` for a 0-dim array.
    pub fn len(&self) -> Option<usize> {
        self.shape.dims.first().copied()
    }

    /// Whether the batch dimension is empty or missing.
    pub fn is_empty(&self) -> bool {
        self.len().unwrap_or(0) == 0
    }

    /// Views the elements as a typed slice.
    pub fn as_slice<E: Element>(&self) -> Result<&[E], TreeError> {
        E::buffer_slice(&self.buffer).ok_or(TreeError::DTypeMismatch {
            expected: E::DTYPE,
            found: self.dtype(),
        })
    }

    /// Casts the elements to another dtype.
    pub fn cast(&self, dtype: DType) -> ArrayData {
        ArrayData::new(self.buffer.cast(dtype), self.shape.clone())
    }

    fn row_elements(&self) -> usize {
        self.shape.tail().num_elements()
    }

    fn batch_len(&self, op: &'static str) -> Result<usize, TreeError> {
        self.len().ok_or(TreeError::UnsupportedPayload {
            op,
            kind: ValueKind::Array,
        })
    }

    /// Concatenates the arrays along dim 0. All shapes must agree on every
    /// dimension except the first, and all dtypes must match.
    pub fn cat(parts: &[&ArrayData]) -> Result<ArrayData, TreeError> {
        let first = parts.first().ok_or_else(|| {
            TreeError::TopologyMismatch("cannot concatenate an empty sequence".to_string())
        })?;
        first.batch_len("cat")?;
        let tail = first.shape.tail();

        let mut rows = 0;
        let mut buffer = first.buffer.slice(0, 0);
        for part in parts {
            if part.shape.tail() != tail {
                return Err(TreeError::TopologyMismatch(
                    "shapes of concatenated arrays must match on all dims except 0".to_string(),
                ));
            }
            rows += part.batch_len("cat")?;
            buffer.extend(&part.buffer)?;
        }

        let mut dims = vec![rows];
        dims.extend_from_slice(&tail.dims);
        Ok(ArrayData::new(buffer, Shape::new(dims)))
    }

    /// Stacks the arrays along a new leading dim 0. All shapes and dtypes
    /// must be fully equal.
    pub fn stack(parts: &[&ArrayData]) -> Result<ArrayData, TreeError> {
        let first = parts.first().ok_or_else(|| {
            TreeError::TopologyMismatch("cannot stack an empty sequence".to_string())
        })?;

        let mut buffer = first.buffer.slice(0, 0);
        for part in parts {
            if part.shape != first.shape {
                return Err(TreeError::TopologyMismatch(
                    "shapes of stacked arrays must be fully equal".to_string(),
                ));
            }
            buffer.extend(&part.buffer)?;
        }

        let mut dims = vec![parts.len()];
        dims.extend_from_slice(&first.shape.dims);
        Ok(ArrayData::new(buffer, Shape::new(dims)))
    }

    /// Splits the array along dim 0 into chunks of `split_size` rows; the
    /// last chunk may be shorter.
    pub fn split(&self, split_size: usize) -> Result<Vec<ArrayData>, TreeError> {
        if split_size == 0 {
            return Err(TreeError::ZeroSplitSize);
        }
        let rows = self.batch_len("split")?;
        let row_elements = self.row_elements();

        let mut chunks = Vec::with_capacity(rows.div_ceil(split_size));
        let mut start = 0;
        while start < rows {
            let end = usize::min(start + split_size, rows);
            let mut dims = vec![end - start];
            dims.extend_from_slice(&self.shape.tail().dims);
            chunks.push(ArrayData::new(
                self.buffer.slice(start * row_elements, end * row_elements),
                Shape::new(dims),
            ));
            start = end;
        }
        Ok(chunks)
    }

    /// Applies a row index along dim 0. A single index drops the batch
    /// dimension; ranges are clamped to the batch length like slices.
    pub fn select(&self, index: &RowIndex) -> Result<ArrayData, TreeError> {
        let rows = self.batch_len("iloc")?;
        let row_elements = self.row_elements();

        match index {
            RowIndex::Index(i) => {
                if *i >= rows {
                    return Err(TreeError::IndexOutOfBounds {
                        index: *i,
                        len: rows,
                    });
                }
                Ok(ArrayData::new(
                    self.buffer
                        .slice(i * row_elements, (i + 1) * row_elements),
                    self.shape.tail(),
                ))
            }
            RowIndex::Range(range) => {
                let end = usize::min(range.end, rows);
                let start = usize::min(range.start, end);
                let mut dims = vec![end - start];
                dims.extend_from_slice(&self.shape.tail().dims);
                Ok(ArrayData::new(
                    self.buffer.slice(start * row_elements, end * row_elements),
                    Shape::new(dims),
                ))
            }
            RowIndex::Indices(indices) => {
                for &i in indices {
                    if i >= rows {
                        return Err(TreeError::IndexOutOfBounds { index: i, len: rows });
                    }
                }
                let mut dims = vec![indices.len()];
                dims.extend_from_slice(&self.shape.tail().dims);
                Ok(ArrayData::new(
                    self.buffer.gather_rows(indices, row_elements),
                    Shape::new(dims),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arange(rows: usize, cols: usize) -> ArrayData {
        let values: Vec<f32> = (0..rows * cols).map(|v| v as f32).collect();
        ArrayData::from_vec(values, [rows, cols])
    }

    #[test]
    fn cast_roundtrips_through_f64() {
        let array = ArrayData::from_vec(vec![1.5f32, -2.5], [2]);
        let casted = array.cast(DType::I64);
        assert_eq!(casted.as_slice::<i64>().unwrap(), &[1, -2]);
        assert_eq!(casted.cast(DType::F32).as_slice::<f32>().unwrap(), &[1.0, -2.0]);
    }

    #[test]
    fn cat_sums_batch_dims() {
        let a = arange(4, 5);
        let b = arange(4, 5);
        let merged = ArrayData::cat(&[&a, &b]).unwrap();
        assert_eq!(merged.shape, Shape::from([8, 5]));
    }

    #[test]
    fn cat_rejects_mismatched_tails() {
        let a = arange(4, 5);
        let b = arange(4, 6);
        assert!(matches!(
            ArrayData::cat(&[&a, &b]),
            Err(TreeError::TopologyMismatch(_))
        ));
    }

    #[test]
    fn cat_rejects_mixed_dtypes() {
        let a = arange(2, 2);
        let b = arange(2, 2).cast(DType::F64);
        assert!(matches!(
            ArrayData::cat(&[&a, &b]),
            Err(TreeError::DTypeMismatch { .. })
        ));
    }

    #[test]
    fn stack_adds_leading_dim() {
        let a = arange(4, 5);
        let b = arange(4, 5);
        let stacked = ArrayData::stack(&[&a, &b]).unwrap();
        assert_eq!(stacked.shape, Shape::from([2, 4, 5]));
    }

    #[test]
    fn split_keeps_remainder_in_last_chunk() {
        let array = arange(5, 2);
        let chunks = array.split(2).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].shape, Shape::from([2, 2]));
        assert_eq!(chunks[2].shape, Shape::from([1, 2]));
        assert_eq!(chunks[2].as_slice::<f32>().unwrap(), &[8.0, 9.0]);
    }

    #[test]
    fn split_rejects_zero_size() {
        let array = arange(4, 2);
        assert_eq!(array.split(0), Err(TreeError::ZeroSplitSize));
    }

    #[test]
    fn select_single_index_drops_batch_dim() {
        let array = arange(3, 2);
        let row = array.select(&RowIndex::Index(1)).unwrap();
        assert_eq!(row.shape, Shape::from([2]));
        assert_eq!(row.as_slice::<f32>().unwrap(), &[2.0, 3.0]);
        assert!(matches!(
            array.select(&RowIndex::Index(3)),
            Err(TreeError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn select_indices_gathers_rows() {
        let array = arange(3, 2);
        let picked = array.select(&RowIndex::Indices(vec![2, 0])).unwrap();
        assert_eq!(picked.shape, Shape::from([2, 2]));
        assert_eq!(picked.as_slice::<f32>().unwrap(), &[4.0, 5.0, 0.0, 1.0]);
    }

    #[test]
    fn select_range_is_clamped() {
        let array = arange(3, 2);
        let sliced = array.select(&RowIndex::Range(1..10)).unwrap();
        assert_eq!(sliced.shape, Shape::from([2, 2]));
    }
}
