//! Missing-value marker handling.
//!
//! Grouped and windowed buffers mark "no data" cells with a floating NaN. Element
//! types that cannot hold NaN (integers, booleans) report no marker, and every
//! operation that needs to pad a buffer rejects them with `TypeUnsupported`.

use std::fmt::{self, Debug, Display};

/// Element type tag, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Bool,
}

impl DType {
    /// Whether values of this type can carry the missing-value marker
    pub fn supports_missing(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Bool => "bool",
        };
        write!(f, "{}", name)
    }
}

/// A buffer element that can be gathered into the grouped layout
pub trait Element: Copy + Send + Sync + Debug + 'static {
    const DTYPE: DType;

    /// The missing-value marker, if this type has one
    fn missing() -> Option<Self>;

    /// Whether this value is the missing-value marker
    fn is_missing(&self) -> bool;
}

macro_rules! impl_float_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn missing() -> Option<Self> {
                Some(<$t>::NAN)
            }

            #[inline]
            fn is_missing(&self) -> bool {
                self.is_nan()
            }
        }
    };
}

macro_rules! impl_plain_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn missing() -> Option<Self> {
                None
            }

            #[inline]
            fn is_missing(&self) -> bool {
                false
            }
        }
    };
}

impl_float_element!(f32, DType::Float32);
impl_float_element!(f64, DType::Float64);
impl_plain_element!(i8, DType::Int8);
impl_plain_element!(i16, DType::Int16);
impl_plain_element!(i32, DType::Int32);
impl_plain_element!(i64, DType::Int64);
impl_plain_element!(u8, DType::UInt8);
impl_plain_element!(u16, DType::UInt16);
impl_plain_element!(u32, DType::UInt32);
impl_plain_element!(u64, DType::UInt64);
impl_plain_element!(bool, DType::Bool);

/// Explicit optional wrapper for callers that prefer not to deal in NaN.
///
/// `NA::NA` maps to the marker on the way into a buffer and back on the way out.
#[derive(Clone, Copy, PartialEq)]
pub enum NA<T> {
    /// A present value
    Value(T),
    /// No data
    NA,
}

impl<T> NA<T> {
    pub fn is_na(&self) -> bool {
        matches!(self, NA::NA)
    }

    pub fn is_value(&self) -> bool {
        !self.is_na()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            NA::Value(v) => Some(v),
            NA::NA => None,
        }
    }
}

impl<T: Element> NA<T> {
    /// Read a buffer cell, turning the marker into `NA::NA`
    pub fn from_element(value: T) -> Self {
        if value.is_missing() {
            NA::NA
        } else {
            NA::Value(value)
        }
    }

    /// Write into a buffer cell; `None` when `NA::NA` meets a type without a marker
    pub fn to_element(self) -> Option<T> {
        match self {
            NA::Value(v) => Some(v),
            NA::NA => T::missing(),
        }
    }
}

impl<T> From<Option<T>> for NA<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => NA::Value(v),
            None => NA::NA,
        }
    }
}

impl<T> From<NA<T>> for Option<T> {
    fn from(na: NA<T>) -> Self {
        match na {
            NA::Value(v) => Some(v),
            NA::NA => None,
        }
    }
}

impl<T: Debug> Debug for NA<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NA::Value(v) => write!(f, "{:?}", v),
            NA::NA => write!(f, "NA"),
        }
    }
}

impl<T: Display> Display for NA<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NA::Value(v) => write!(f, "{}", v),
            NA::NA => write!(f, "NA"),
        }
    }
}
