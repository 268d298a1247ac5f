//! gander - heuristic article-content extraction from news and article
//! pages.
//!
//! Raw HTML goes in; out comes an [`Article`] with the body text, title,
//! authors, publish date, images, videos and meta fields, selected by a
//! stopword-density scoring pipeline that works across unrelated site
//! templates with no per-site rules.
//!
//! # Example
//!
//! ```no_run
//! use gander::{Config, Gander};
//!
//! fn main() -> Result<(), gander::ExtractError> {
//!     let gander = Gander::new(Config::default());
//!     let article = gander.extract_url("https://example.com/news/story")?;
//!     println!("{}", article.title);
//!     println!("{}", article.body_text);
//!     Ok(())
//! }
//! ```

pub mod article;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod format;
pub mod nlp;
pub mod page;
pub mod resource;
pub mod stopwords;
pub mod text;

pub use crate::article::Article;
pub use crate::config::{Config, ConfigBuilder, ParserKind};
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extract::videos::Video;
pub use crate::format::{FormattedOutput, ReconcileOutcome};
pub use crate::page::{Gander, Page};
