use core::fmt;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A constructor or factory was handed malformed parameters.
    InvalidArgument,
    /// A cursor was advanced past its last element.
    NoSuchElement,
    /// A cursor removal was requested when nothing is removable.
    IllegalState,
}

/// Errors reported by the map and set constructors and by [`Cursor`].
///
/// [`Cursor`]: crate::hash_table::Cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The load factor is not inside the open interval `(0, 1)`.
    InvalidLoadFactor(f32),
    /// No power-of-two table can hold the requested number of elements.
    CapacityOverflow {
        /// The requested element count.
        expected: usize,
    },
    /// Parallel key and value arrays differ in length.
    LengthMismatch {
        /// Number of keys supplied.
        keys: usize,
        /// Number of values supplied.
        values: usize,
    },
    /// A factory that forbids duplicates saw the same key twice.
    DuplicateKey(u64),
    /// The cursor has no more elements.
    NoSuchElement,
    /// The cursor has no element that can be removed.
    IllegalState,
}

impl Error {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidLoadFactor(_)
            | Error::CapacityOverflow { .. }
            | Error::LengthMismatch { .. }
            | Error::DuplicateKey(_) => ErrorKind::InvalidArgument,
            Error::NoSuchElement => ErrorKind::NoSuchElement,
            Error::IllegalState => ErrorKind::IllegalState,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLoadFactor(load_factor) => write!(
                f,
                "load factor must be greater than 0 and smaller than 1, got {}",
                load_factor
            ),
            Error::CapacityOverflow { expected } => {
                write!(f, "cannot size a table for {} elements", expected)
            }
            Error::LengthMismatch { keys, values } => write!(
                f,
                "the key array and the value array have different lengths ({} and {})",
                keys, values
            ),
            Error::DuplicateKey(key) => write!(f, "duplicate key {}", key),
            Error::NoSuchElement => f.write_str("no more elements"),
            Error::IllegalState => f.write_str("no element to remove"),
        }
    }
}

impl core::error::Error for Error {}
