//! Coded error type shared by every store operation.
//!
//! Each failure carries an [`ErrorCode`] from a closed set, grouped by concern
//! in numeric ranges (1000s file, 2000s data, 3000s database, 4000s key,
//! 5000s value, 6000s operation, 9000s unknown). Branch on [`Error::code`]
//! rather than on the message text.

use std::fmt;
use std::path::Path;

/// Machine-readable failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u16)]
pub enum ErrorCode {
    /// The referenced file does not exist.
    FileNotFound = 1000,
    /// The backing file could not be read or parsed.
    FileReadError = 1001,
    /// The backing file could not be written.
    FileWriteError = 1002,
    /// The file name is empty or reserved.
    InvalidFileName = 1003,

    /// Required data was not supplied.
    DataNotDefined = 2000,
    /// The key is not present in the document.
    DataNotFound = 2001,
    /// A value has the wrong shape for the operation.
    InvalidDataType = 2002,
    /// Nothing was supplied to add.
    NoDataToAdd = 2003,
    /// The document holds no data.
    NoDataFound = 2004,
    /// A file name was required but not supplied.
    FileNotDefined = 2005,
    /// The data must be a JSON object.
    DataMustBeObject = 2006,

    /// A composite operation failed.
    DatabaseOperationFailed = 3000,
    /// An update could not be applied.
    InvalidUpdateOperation = 3001,
    /// Merging another document failed.
    MergeFailed = 3002,

    /// The key is empty.
    KeyNotDefined = 4000,
    /// The key was not found.
    KeyNotFound = 4001,
    /// The key already holds a value.
    KeyAlreadyDeclared = 4002,

    /// The stored value is not an array.
    ValueNotArray = 5000,
    /// The stored value is not an object.
    ValueNotObject = 5001,
    /// The stored value is not a boolean.
    ValueNotBoolean = 5002,
    /// A number was required.
    ValueNotNumber = 5003,

    /// The arithmetic operator is missing or unsupported.
    InvalidOperation = 6000,

    /// Catch-all.
    #[default]
    UnknownError = 9000,
}

/// The concern an [`ErrorCode`] belongs to, derived from its numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 1000s: the backing file.
    File,
    /// 2000s: data shape.
    Data,
    /// 3000s: composite operations.
    Database,
    /// 4000s: keys.
    Key,
    /// 5000s: stored value types.
    Value,
    /// 6000s: operators.
    Operation,
    /// 9000s: everything else.
    Unknown,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: [ErrorCode; 23] = [
        ErrorCode::FileNotFound,
        ErrorCode::FileReadError,
        ErrorCode::FileWriteError,
        ErrorCode::InvalidFileName,
        ErrorCode::DataNotDefined,
        ErrorCode::DataNotFound,
        ErrorCode::InvalidDataType,
        ErrorCode::NoDataToAdd,
        ErrorCode::NoDataFound,
        ErrorCode::FileNotDefined,
        ErrorCode::DataMustBeObject,
        ErrorCode::DatabaseOperationFailed,
        ErrorCode::InvalidUpdateOperation,
        ErrorCode::MergeFailed,
        ErrorCode::KeyNotDefined,
        ErrorCode::KeyNotFound,
        ErrorCode::KeyAlreadyDeclared,
        ErrorCode::ValueNotArray,
        ErrorCode::ValueNotObject,
        ErrorCode::ValueNotBoolean,
        ErrorCode::ValueNotNumber,
        ErrorCode::InvalidOperation,
        ErrorCode::UnknownError,
    ];

    /// Numeric value of the code.
    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Upper snake case name, e.g. `KEY_NOT_DEFINED`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::FileReadError => "FILE_READ_ERROR",
            ErrorCode::FileWriteError => "FILE_WRITE_ERROR",
            ErrorCode::InvalidFileName => "INVALID_FILE_NAME",
            ErrorCode::DataNotDefined => "DATA_NOT_DEFINED",
            ErrorCode::DataNotFound => "DATA_NOT_FOUND",
            ErrorCode::InvalidDataType => "INVALID_DATA_TYPE",
            ErrorCode::NoDataToAdd => "NO_DATA_TO_ADD",
            ErrorCode::NoDataFound => "NO_DATA_FOUND",
            ErrorCode::FileNotDefined => "FILE_NOT_DEFINED",
            ErrorCode::DataMustBeObject => "DATA_MUST_BE_OBJECT",
            ErrorCode::DatabaseOperationFailed => "DATABASE_OPERATION_FAILED",
            ErrorCode::InvalidUpdateOperation => "INVALID_UPDATE_OPERATION",
            ErrorCode::MergeFailed => "MERGE_FAILED",
            ErrorCode::KeyNotDefined => "KEY_NOT_DEFINED",
            ErrorCode::KeyNotFound => "KEY_NOT_FOUND",
            ErrorCode::KeyAlreadyDeclared => "KEY_ALREADY_DECLARED",
            ErrorCode::ValueNotArray => "VALUE_NOT_ARRAY",
            ErrorCode::ValueNotObject => "VALUE_NOT_OBJECT",
            ErrorCode::ValueNotBoolean => "VALUE_NOT_BOOLEAN",
            ErrorCode::ValueNotNumber => "VALUE_NOT_NUMBER",
            ErrorCode::InvalidOperation => "INVALID_OPERATION",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Which group the code belongs to.
    #[must_use]
    pub fn category(self) -> ErrorCategory {
        match self.code() / 1000 {
            1 => ErrorCategory::File,
            2 => ErrorCategory::Data,
            3 => ErrorCategory::Database,
            4 => ErrorCategory::Key,
            5 => ErrorCategory::Value,
            6 => ErrorCategory::Operation,
            _ => ErrorCategory::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = u16;

    /// Fails with the input when no code has that value.
    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|c| c.code() == value)
            .ok_or(value)
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A failed store operation: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({code})")]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Build an error with an explicit code.
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build an error with [`ErrorCode::UnknownError`].
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::default())
    }

    /// The failure code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The message, without the code suffix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// `true` if this error carries `code`.
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    pub(crate) fn key_not_defined() -> Self {
        Self::new("the key is not defined", ErrorCode::KeyNotDefined)
    }

    pub(crate) fn data_not_found(key: &str) -> Self {
        Self::new(format!("no data found for key: {key}"), ErrorCode::DataNotFound)
    }

    pub(crate) fn not_a_number(key: &str) -> Self {
        Self::new(
            format!("value at key {key} must be a number"),
            ErrorCode::ValueNotNumber,
        )
    }

    pub(crate) fn read(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(
            format!("cannot read {}: {err}", path.display()),
            ErrorCode::FileReadError,
        )
    }

    pub(crate) fn write(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(
            format!("cannot write {}: {err}", path.display()),
            ErrorCode::FileWriteError,
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::new(err.to_string(), ErrorCode::FileNotFound),
            _ => Error::unknown(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() || err.is_syntax() || err.is_eof() {
            Error::new(err.to_string(), ErrorCode::FileReadError)
        } else {
            Error::new(err.to_string(), ErrorCode::InvalidDataType)
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_keep_their_numbers() {
        assert_eq!(ErrorCode::FileNotFound.code(), 1000);
        assert_eq!(ErrorCode::DataMustBeObject.code(), 2006);
        assert_eq!(ErrorCode::MergeFailed.code(), 3002);
        assert_eq!(ErrorCode::KeyAlreadyDeclared.code(), 4002);
        assert_eq!(ErrorCode::ValueNotNumber.code(), 5003);
        assert_eq!(ErrorCode::InvalidOperation.code(), 6000);
        assert_eq!(ErrorCode::UnknownError.code(), 9000);
    }

    #[test]
    fn category_follows_range() {
        for code in ErrorCode::ALL {
            let expected = match code.code() {
                1000..=1999 => ErrorCategory::File,
                2000..=2999 => ErrorCategory::Data,
                3000..=3999 => ErrorCategory::Database,
                4000..=4999 => ErrorCategory::Key,
                5000..=5999 => ErrorCategory::Value,
                6000..=6999 => ErrorCategory::Operation,
                _ => ErrorCategory::Unknown,
            };
            assert_eq!(code.category(), expected, "{code}");
        }
    }

    #[test]
    fn try_from_u16() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(1234), Err(1234));
    }

    #[test]
    fn default_code_is_unknown() {
        let err = Error::unknown("boom");
        assert_eq!(err.code(), ErrorCode::UnknownError);
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "boom (UNKNOWN_ERROR)");
    }

    #[test]
    fn serde_syntax_error_is_read_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{nope")
            .unwrap_err()
            .into();
        assert!(err.is(ErrorCode::FileReadError));
    }
}
