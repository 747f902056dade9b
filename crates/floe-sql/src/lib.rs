//! # floe-sql
//!
//! SQL handling for the Floe gateway.
//!
//! This crate provides:
//! - A lexical write-operation detector that decides, before execution,
//!   whether a SQL text could mutate state
//! - Dialect selection for the tokenizer
//! - Identifier validation for generated introspection queries
//!
//! ## Classification
//!
//! | Input | Result |
//! |-------|--------|
//! | `SELECT ...`, `SHOW ...`, `DESCRIBE ...`, `VALUES ...` | read |
//! | `WITH ... AS (...) SELECT ...` | read |
//! | `INSERT`, `UPDATE`, `DELETE`, `CREATE`, `DROP`, `ALTER`, `TRUNCATE`, `MERGE`, `GRANT`, `REVOKE`, `CALL` | write |
//! | `SELECT 1; DROP TABLE x` | write (any segment) |
//! | comments only, unknown verb, unlexable text | write |
//! | empty or whitespace | read (nothing to execute) |
//!
//! ```
//! use floe_sql::WriteDetector;
//!
//! let detector = WriteDetector::new();
//! assert!(detector.classify("-- note\nDELETE FROM t").contains_write);
//! assert!(detector.classify("WITH a AS (SELECT 1) SELECT * FROM a").is_read_only());
//! ```

pub mod detector;
pub mod dialect;
pub mod error;
pub mod ident;

pub use detector::{
    classify, DetectionResult, SegmentClassification, StatementType, WriteDetector,
};
pub use dialect::SqlDialect;
pub use error::SqlError;
pub use ident::{normalize_identifier, quote_literal, validate_identifier, QualifiedTable};
