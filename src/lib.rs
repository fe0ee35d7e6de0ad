//! Single-file JSON key-value store.
//!
//! Every operation reads the whole file, checks its preconditions, applies the
//! change in memory and writes the whole document back. Failures carry an
//! [`ErrorCode`] you can branch on.
//!
//! ```rust,no_run
//! use json_kv::{ErrorCode, JsonKv, MathOp};
//!
//! let db = JsonKv::open("app").unwrap(); // ./app.json
//! db.set("visits", 0).unwrap();
//! db.add("visits", 1.0).unwrap();
//! db.math("visits", MathOp::Mul, 10.0).unwrap();
//!
//! let err = db.set("visits", 5).unwrap_err();
//! assert_eq!(err.code(), ErrorCode::KeyAlreadyDeclared);
//! ```
//!
//! **Single writer.** Two stores (or processes) on the same file will clobber
//! each other's updates. Opt into [`JsonKvBuilder::lock`] on every opener if
//! that matters.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod math;
pub mod persist;
pub mod resolve;
pub mod serializer;
pub mod store;
pub mod value;

pub use error::{Error, ErrorCategory, ErrorCode, Result};
pub use math::MathOp;
pub use store::{JsonKv, JsonKvBuilder, OverwriteGuard, DEFAULT_FILE_NAME};
pub use value::{Document, Entry};
