use crate::value::Buffer;
use serde::{Deserialize, Serialize};

/// Supported element types for array and tensor payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// 32-bit floating point.
    F32,
    /// 64-bit floating point.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Boolean.
    Bool,
}

/// A Rust primitive usable as an array element.
///
/// `f64` is the cast currency: dtype casts go through [`to_f64`] and
/// [`from_f64`] and are lossy the way numeric casts usually are.
///
/// [`to_f64`]: Element::to_f64
/// [`from_f64`]: Element::from_f64
pub trait Element: Copy + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// The dtype tag for this element type.
    const DTYPE: DType;

    /// Converts into f64.
    fn to_f64(self) -> f64;

    /// Converts from f64.
    fn from_f64(value: f64) -> Self;

    /// Wraps a vector of elements in the matching buffer variant.
    fn into_buffer(values: Vec<Self>) -> Buffer;

    /// Views the buffer as a slice of this element type, if the dtype matches.
    fn buffer_slice(buffer: &Buffer) -> Option<&[Self]>;
}

macro_rules! element {
    ($ty:ty, $dtype:ident, $to:expr, $from:expr) => {
        impl Element for $ty {
            const DTYPE: DType = DType::$dtype;

            fn to_f64(self) -> f64 {
                #[allow(clippy::redundant_closure_call)]
                ($to)(self)
            }

            fn from_f64(value: f64) -> Self {
                #[allow(clippy::redundant_closure_call)]
                ($from)(value)
            }

            fn into_buffer(values: Vec<Self>) -> Buffer {
                Buffer::$dtype(values)
            }

            fn buffer_slice(buffer: &Buffer) -> Option<&[Self]> {
                match buffer {
                    Buffer::$dtype(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

element!(f32, F32, |v: f32| v as f64, |v: f64| v as f32);
element!(f64, F64, |v: f64| v, |v: f64| v);
element!(i32, I32, |v: i32| v as f64, |v: f64| v as i32);
element!(i64, I64, |v: i64| v as f64, |v: f64| v as i64);
element!(bool, Bool, |v: bool| if v { 1.0 } else { 0.0 }, |v: f64| {
    v != 0.0
});
