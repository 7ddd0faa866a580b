//! Built-in filters
//!
//! Markdown goes through comrak. Textile and reStructuredText are parsed
//! into the shared document model in [`common`] and rendered through an
//! html5ever DOM. Linebreaks is plain string work.

pub mod common;
pub mod linebreaks;
pub mod markdown;
pub mod restructuredtext;
pub mod textile;

pub use linebreaks::LinebreaksFilter;
pub use markdown::MarkdownFilter;
pub use restructuredtext::RestructuredTextFilter;
pub use textile::TextileFilter;
