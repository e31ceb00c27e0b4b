use std::fmt;

use hdf5::types::VarLenUnicode;
use hdf5::H5Type;
use ndarray::{Array, ArrayD, Dimension, IxDyn, ShapeError};

/// Element type of a field array
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 8-bit integer
    UInt8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Unsigned 64-bit integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Boolean
    Bool,
    /// Variable-length UTF-8 string
    String,
}

impl ElementType {
    /// Size of one element in bytes, `None` for variable-length types
    pub fn size(&self) -> Option<usize> {
        match self {
            ElementType::Int8 | ElementType::UInt8 | ElementType::Bool => Some(1),
            ElementType::Int16 | ElementType::UInt16 => Some(2),
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => Some(4),
            ElementType::Int64 | ElementType::UInt64 | ElementType::Float64 => Some(8),
            ElementType::String => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::UInt8 => "uint8",
            ElementType::UInt16 => "uint16",
            ElementType::UInt32 => "uint32",
            ElementType::UInt64 => "uint64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Bool => "bool",
            ElementType::String => "string",
        };
        f.write_str(name)
    }
}

/// A typed N-dimensional array held by one field of a batch.
///
/// Axis 0 is the record axis: a field of shape `(depth, ...)` carries `depth`
/// records, each of the trailing shape.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldArray {
    /// `int8` data
    Int8(ArrayD<i8>),
    /// `int16` data
    Int16(ArrayD<i16>),
    /// `int32` data
    Int32(ArrayD<i32>),
    /// `int64` data
    Int64(ArrayD<i64>),
    /// `uint8` data
    UInt8(ArrayD<u8>),
    /// `uint16` data
    UInt16(ArrayD<u16>),
    /// `uint32` data
    UInt32(ArrayD<u32>),
    /// `uint64` data
    UInt64(ArrayD<u64>),
    /// `float32` data
    Float32(ArrayD<f32>),
    /// `float64` data
    Float64(ArrayD<f64>),
    /// Boolean data
    Bool(ArrayD<bool>),
    /// Variable-length string data
    String(ArrayD<VarLenUnicode>),
}

/// Run an expression against the typed array inside a [`FieldArray`].
macro_rules! with_field_array {
    ($array:expr, $data:ident => $body:expr) => {
        match $array {
            $crate::batch::FieldArray::Int8($data) => $body,
            $crate::batch::FieldArray::Int16($data) => $body,
            $crate::batch::FieldArray::Int32($data) => $body,
            $crate::batch::FieldArray::Int64($data) => $body,
            $crate::batch::FieldArray::UInt8($data) => $body,
            $crate::batch::FieldArray::UInt16($data) => $body,
            $crate::batch::FieldArray::UInt32($data) => $body,
            $crate::batch::FieldArray::UInt64($data) => $body,
            $crate::batch::FieldArray::Float32($data) => $body,
            $crate::batch::FieldArray::Float64($data) => $body,
            $crate::batch::FieldArray::Bool($data) => $body,
            $crate::batch::FieldArray::String($data) => $body,
        }
    };
}

pub(crate) use with_field_array;

impl FieldArray {
    /// Build an array from a shape and row-major data
    pub fn from_shape_vec<T: Element>(shape: &[usize], data: Vec<T>) -> Result<Self, ShapeError> {
        ArrayD::from_shape_vec(IxDyn(shape), data).map(T::wrap)
    }

    /// Full shape of the array
    pub fn shape(&self) -> &[usize] {
        with_field_array!(self, data => data.shape())
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of records (length of axis 0), `None` for zero-dimensional arrays
    pub fn depth(&self) -> Option<usize> {
        self.shape().first().copied()
    }

    /// Shape of a single record (the shape without axis 0)
    pub fn element_shape(&self) -> &[usize] {
        self.shape().get(1..).unwrap_or(&[])
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        with_field_array!(self, data => data.len())
    }

    /// Whether the array holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type
    pub fn dtype(&self) -> ElementType {
        match self {
            FieldArray::Int8(_) => ElementType::Int8,
            FieldArray::Int16(_) => ElementType::Int16,
            FieldArray::Int32(_) => ElementType::Int32,
            FieldArray::Int64(_) => ElementType::Int64,
            FieldArray::UInt8(_) => ElementType::UInt8,
            FieldArray::UInt16(_) => ElementType::UInt16,
            FieldArray::UInt32(_) => ElementType::UInt32,
            FieldArray::UInt64(_) => ElementType::UInt64,
            FieldArray::Float32(_) => ElementType::Float32,
            FieldArray::Float64(_) => ElementType::Float64,
            FieldArray::Bool(_) => ElementType::Bool,
            FieldArray::String(_) => ElementType::String,
        }
    }
}

/// Element types that can be stored in a [`FieldArray`]
pub trait Element: H5Type + Clone {
    /// Matching element type tag
    const TYPE: ElementType;

    /// Wrap a dynamic-dimension array in the matching variant
    fn wrap(array: ArrayD<Self>) -> FieldArray;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const TYPE: ElementType = ElementType::$variant;

                fn wrap(array: ArrayD<Self>) -> FieldArray {
                    FieldArray::$variant(array)
                }
            }
        )*
    };
}

impl_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
    VarLenUnicode => String,
);

impl<T: Element, D: Dimension> From<Array<T, D>> for FieldArray {
    fn from(array: Array<T, D>) -> Self {
        T::wrap(array.into_dyn())
    }
}
