//! Whole-document tests for the built-in filters

mod markdown;
mod restructuredtext;
mod textile;
