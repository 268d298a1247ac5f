//! Field extractors consuming the DOM adapter.

pub mod authors;
pub mod content;
pub mod date;
pub mod images;
pub mod metadata;
pub mod videos;
