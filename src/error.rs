//! Error types for lanewise operations.
//!
//! Every failure in this crate is an argument-validation failure detected
//! synchronously at the call site, before any lane is computed or any element
//! is written. Nothing is retried and nothing degrades to a partial result.

use std::fmt;

use crate::simd::ElementKind;

/// Errors that can occur during lanewise operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorError {
    /// A lane or buffer index fell outside its valid range.
    IndexOutOfBounds {
        /// The offending index (or the first index of an out-of-range window).
        index: usize,
        /// The exclusive upper bound the index had to respect.
        length: usize,
    },
    /// Two values or buffers that must agree on length do not.
    LengthMismatch {
        /// The length the operation required.
        expected: usize,
        /// The length that was supplied.
        actual: usize,
        /// Human-readable error message.
        message: String,
    },
    /// A packed representation cannot hold every lane.
    CapacityExceeded {
        /// Number of lanes that had to be packed.
        lanes: usize,
        /// Number of lanes the representation can hold.
        capacity: usize,
    },
    /// A raw shuffle index lies outside `[-lane_count, lane_count)`.
    InvalidShuffleIndex {
        /// Lane holding the offending index.
        lane: usize,
        /// The offending index.
        index: i32,
        /// Lane count of the shuffle's species.
        lane_count: usize,
    },
    /// A `part` selector is outside the range allowed for the operation.
    InvalidPart {
        /// The offending part number.
        part: isize,
        /// Human-readable error message.
        message: String,
    },
    /// The operator is not defined for the element kind.
    UnsupportedOperation {
        /// Operator name.
        op: &'static str,
        /// Element kind the operator was applied to.
        kind: ElementKind,
    },
    /// An integral lanewise operation has no defined result (division by zero).
    ArithmeticError {
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorError::IndexOutOfBounds { index, length } => {
                write!(f, "Index out of bounds: {} (length: {})", index, length)
            }
            VectorError::LengthMismatch {
                expected,
                actual,
                message,
            } => write!(
                f,
                "Length mismatch: {} (expected {}, got {})",
                message, expected, actual
            ),
            VectorError::CapacityExceeded { lanes, capacity } => write!(
                f,
                "Capacity exceeded: {} lanes do not fit in {} bits",
                lanes, capacity
            ),
            VectorError::InvalidShuffleIndex {
                lane,
                index,
                lane_count,
            } => write!(
                f,
                "Invalid shuffle index {} at lane {} (valid range: [-{}, {}))",
                index, lane, lane_count, lane_count
            ),
            VectorError::InvalidPart { part, message } => {
                write!(f, "Bad part number {}: {}", part, message)
            }
            VectorError::UnsupportedOperation { op, kind } => {
                write!(f, "Unsupported operation: {} is not defined for {}", op, kind)
            }
            VectorError::ArithmeticError { message } => {
                write!(f, "Arithmetic error: {}", message)
            }
        }
    }
}

impl std::error::Error for VectorError {}

/// Result type alias for lanewise operations.
pub type Result<T> = std::result::Result<T, VectorError>;

/// Creates an index-out-of-bounds error.
pub fn index_out_of_bounds(index: usize, length: usize) -> VectorError {
    VectorError::IndexOutOfBounds { index, length }
}

/// Creates a length-mismatch error.
pub fn length_mismatch(expected: usize, actual: usize, message: impl Into<String>) -> VectorError {
    VectorError::LengthMismatch {
        expected,
        actual,
        message: message.into(),
    }
}

/// Creates a capacity-exceeded error.
pub fn capacity_exceeded(lanes: usize, capacity: usize) -> VectorError {
    VectorError::CapacityExceeded { lanes, capacity }
}

/// Creates an invalid-shuffle-index error.
pub fn invalid_shuffle_index(lane: usize, index: i32, lane_count: usize) -> VectorError {
    VectorError::InvalidShuffleIndex {
        lane,
        index,
        lane_count,
    }
}

/// Creates an invalid-part error.
pub fn invalid_part(part: isize, message: impl Into<String>) -> VectorError {
    VectorError::InvalidPart {
        part,
        message: message.into(),
    }
}

/// Creates an unsupported-operation error.
pub fn unsupported_operation(op: &'static str, kind: ElementKind) -> VectorError {
    VectorError::UnsupportedOperation { op, kind }
}

/// Creates an arithmetic error.
pub fn arithmetic_error(message: impl Into<String>) -> VectorError {
    VectorError::ArithmeticError {
        message: message.into(),
    }
}

/// Checks `index < length`.
#[inline(always)]
pub(crate) fn check_index(index: usize, length: usize) -> Result<usize> {
    if index < length {
        Ok(index)
    } else {
        Err(index_out_of_bounds(index, length))
    }
}

/// Checks that the window `[offset, offset + len)` fits in `length`.
#[inline(always)]
pub(crate) fn check_window(offset: usize, len: usize, length: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= length => Ok(()),
        _ => Err(index_out_of_bounds(offset, length)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_out_of_bounds_display() {
        let error = index_out_of_bounds(4, 4);
        let display = format!("{}", error);
        assert!(display.contains("Index out of bounds"));
        assert!(display.contains("4 (length: 4)"));
    }

    #[test]
    fn test_length_mismatch_display() {
        let error = length_mismatch(8, 3, "mask array must cover every lane");
        let display = format!("{}", error);
        assert!(display.contains("Length mismatch"));
        assert!(display.contains("expected 8, got 3"));
        assert!(display.contains("mask array must cover every lane"));
    }

    #[test]
    fn test_unsupported_operation_display() {
        let error = unsupported_operation("AND", ElementKind::F32);
        let display = format!("{}", error);
        assert!(display.contains("AND"));
        assert!(display.contains("f32"));
    }

    #[test]
    fn test_invalid_shuffle_index_display() {
        let error = invalid_shuffle_index(2, 9, 4);
        let display = format!("{}", error);
        assert!(display.contains("Invalid shuffle index 9 at lane 2"));
        assert!(display.contains("[-4, 4)"));
    }

    #[test]
    fn test_check_window() {
        assert!(check_window(0, 4, 4).is_ok());
        assert!(check_window(1, 4, 4).is_err());
        assert!(check_window(usize::MAX, 2, 4).is_err());
        assert_eq!(check_index(3, 4), Ok(3));
        assert_eq!(check_index(4, 4), Err(index_out_of_bounds(4, 4)));
    }

    #[test]
    fn test_error_equality() {
        let error1 = capacity_exceeded(128, 64);
        let error2 = capacity_exceeded(128, 64);
        let error3 = capacity_exceeded(256, 64);

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = arithmetic_error("division by zero in lane 1");

        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
