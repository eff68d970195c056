use crate::error::TreeError;
use crate::value::{ArrayData, DType, RowIndex, Shape};
use serde::{Deserialize, Serialize};

/// A compute device a tensor payload can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Device {
    /// The CPU.
    #[default]
    Cpu,
    /// A CUDA device with its index.
    Cuda(usize),
}

/// An array payload with device placement and gradient tracking: the
/// "tensor-like" representation.
#[derive(new, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorData {
    /// The underlying element storage.
    pub data: ArrayData,
    /// Where the tensor lives.
    pub device: Device,
    /// Whether the tensor participates in gradient tracking.
    pub requires_grad: bool,
}

impl TensorData {
    /// Wraps an array as an untracked tensor on the CPU.
    pub fn from_array(data: ArrayData) -> Self {
        Self::new(data, Device::Cpu, false)
    }

    /// The dtype of the elements.
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// The shape of the tensor.
    pub fn shape(&self) -> &Shape {
        &self.data.shape
    }

    /// The length of the batch dimension, or `None` for a 0-dim tensor.
    pub fn len(&self) -> Option<usize> {
        self.data.len()
    }

    /// Whether the batch dimension is empty or missing.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A copy detached from gradient tracking.
    pub fn detach(&self) -> TensorData {
        Self::new(self.data.clone(), self.device, false)
    }

    /// A copy placed on another device.
    pub fn to_device(&self, device: Device) -> TensorData {
        Self::new(self.data.clone(), device, self.requires_grad)
    }

    /// Casts the elements to another dtype.
    pub fn cast(&self, dtype: DType) -> TensorData {
        Self::new(self.data.cast(dtype), self.device, self.requires_grad)
    }

    /// Splits the tensor along dim 0 into chunks of `split_size` rows.
    pub fn split(&self, split_size: usize) -> Result<Vec<TensorData>, TreeError> {
        Ok(self
            .data
            .split(split_size)?
            .into_iter()
            .map(|chunk| Self::new(chunk, self.device, self.requires_grad))
            .collect())
    }

    /// Applies a row index along dim 0.
    pub fn select(&self, index: &RowIndex) -> Result<TensorData, TreeError> {
        Ok(Self::new(
            self.data.select(index)?,
            self.device,
            self.requires_grad,
        ))
    }

    /// Concatenates the tensors along dim 0; all devices must match. The
    /// result tracks gradients if any input does.
    pub fn cat(parts: &[&TensorData]) -> Result<TensorData, TreeError> {
        let (device, requires_grad) = Self::merged_device(parts)?;
        let arrays: Vec<&ArrayData> = parts.iter().map(|part| &part.data).collect();
        Ok(Self::new(ArrayData::cat(&arrays)?, device, requires_grad))
    }

    /// Stacks the tensors along a new leading dim 0; all devices must match.
    pub fn stack(parts: &[&TensorData]) -> Result<TensorData, TreeError> {
        let (device, requires_grad) = Self::merged_device(parts)?;
        let arrays: Vec<&ArrayData> = parts.iter().map(|part| &part.data).collect();
        Ok(Self::new(ArrayData::stack(&arrays)?, device, requires_grad))
    }

    fn merged_device(parts: &[&TensorData]) -> Result<(Device, bool), TreeError> {
        let first = parts.first().ok_or_else(|| {
            TreeError::TopologyMismatch("cannot merge an empty sequence of tensors".to_string())
        })?;
        for part in parts {
            if part.device != first.device {
                return Err(TreeError::DeviceMismatch {
                    expected: first.device,
                    found: part.device,
                });
            }
        }
        Ok((
            first.device,
            parts.iter().any(|part| part.requires_grad),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(rows: usize) -> TensorData {
        let values: Vec<f32> = (0..rows * 2).map(|v| v as f32).collect();
        TensorData::from_array(ArrayData::from_vec(values, [rows, 2]))
    }

    #[test]
    fn detach_clears_grad_tracking() {
        let mut t = tensor(2);
        t.requires_grad = true;
        assert!(!t.detach().requires_grad);
    }

    #[test]
    fn to_device_retags() {
        let t = tensor(2);
        assert_eq!(t.to_device(Device::Cuda(0)).device, Device::Cuda(0));
    }

    #[test]
    fn cat_rejects_mixed_devices() {
        let a = tensor(2);
        let b = tensor(2).to_device(Device::Cuda(1));
        assert!(matches!(
            TensorData::cat(&[&a, &b]),
            Err(TreeError::DeviceMismatch { .. })
        ));
    }

    #[test]
    fn cat_propagates_grad_tracking() {
        let a = tensor(2);
        let mut b = tensor(2);
        b.requires_grad = true;
        let merged = TensorData::cat(&[&a, &b]).unwrap();
        assert!(merged.requires_grad);
        assert_eq!(merged.shape(), &Shape::from([4, 2]));
    }
}
