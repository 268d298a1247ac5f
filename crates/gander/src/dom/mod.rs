//! DOM adapter: parsing, query primitives, serialization-based mutation and
//! the document cleaner.

pub mod cleaner;
pub mod parse;
pub mod query;
pub mod serialize;
