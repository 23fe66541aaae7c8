use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Classifies a conversion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input was not a syntactically valid floating-point number.
    Syntax,
    /// The input was well formed but its magnitude does not fit the target
    /// width. Only overflow reports this; underflow saturates to zero
    /// silently.
    Range,
}

/// An error which can be returned when parsing floating-point bytes.
///
/// Carries the failing operation, the original input bytes, and the value the
/// conversion saturated to (±infinity for range errors, zero for syntax
/// errors). Two errors compare equal when their kind, operation, and input
/// agree; the saturated value does not participate.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    op: &'static str,
    input: Vec<u8>,
    value: f64,
}

impl Error {
    pub(crate) fn syntax(op: &'static str, input: &[u8]) -> Error {
        Error {
            kind: ErrorKind::Syntax,
            op,
            input: input.to_vec(),
            value: 0.0,
        }
    }

    pub(crate) fn range(op: &'static str, input: &[u8], value: f64) -> Error {
        Error {
            kind: ErrorKind::Range,
            op,
            input: input.to_vec(),
            value,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Name of the operation that failed, e.g. `"ParseFloat"`.
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// The input bytes handed to the failing operation.
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// The value the conversion saturated to: ±infinity when the magnitude
    /// overflowed the target type, zero for syntax errors.
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.kind == other.kind && self.op == other.op && self.input == other.input
    }
}

impl Eq for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.kind {
            ErrorKind::Syntax => "invalid syntax",
            ErrorKind::Range => "value out of range",
        };
        write!(
            f,
            "{}: parsing {:?}: {}",
            self.op,
            String::from_utf8_lossy(&self.input),
            reason
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
