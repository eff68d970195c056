use serde::{Deserialize, Serialize};

/// Shape of an array or tensor payload.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// The dimensions, outermost first.
    pub dims: Vec<usize>,
}

impl Shape {
    /// The total number of elements of a payload having this shape.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// The number of dimensions.
    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    /// The shape of one row: every dimension except the batch dimension.
    pub fn tail(&self) -> Shape {
        Shape::new(self.dims.get(1..).unwrap_or(&[]).to_vec())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims.to_vec())
    }
}

impl<const D: usize> From<[usize; D]> for Shape {
    fn from(dims: [usize; D]) -> Self {
        Shape::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_elements_multiplies_dims() {
        assert_eq!(Shape::from([4, 5]).num_elements(), 20);
        assert_eq!(Shape::from([]).num_elements(), 1);
    }

    #[test]
    fn tail_drops_batch_dim() {
        assert_eq!(Shape::from([4, 5]).tail(), Shape::from([5]));
        assert_eq!(Shape::from([]).tail(), Shape::from([]));
    }
}
