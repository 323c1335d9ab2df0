//! Compiler test modules.
//!
//! - `core`: projection, FROM, WHERE / ORDER BY / LIMIT, failure cases
//! - `joins`: every join kind and how exclusive joins share the WHERE clause

mod joins;
