//! Pluggable text-to-HTML markup filters
//!
//!     This crate turns user-authored text (Markdown, Textile, reStructuredText or plain text with
//!     line breaks) into HTML, through a registry of named filters. A site picks its default filter
//!     and options in configuration; callers either use that default, name a filter explicitly, or
//!     ask for no transformation at all.
//!
//!     This is a pure lib: it powers the markup cli but supposes no shell environment. Nothing here
//!     prints, reads env vars or touches files. Configuration reaches the registry only through the
//!     Settings trait (see ./settings.rs), and the markup-config crate provides the file backed
//!     implementation.
//!
//! Architecture
//!
//!     .
//!     ├── error.rs                # MarkupError, FilterError, SettingsError, ComparisonError
//!     ├── filter.rs               # MarkupFilter trait, closure adapter
//!     ├── registry.rs             # MarkupRegistry: registration, resolution, dispatch
//!     ├── settings.rs             # Settings trait, in-memory StaticSettings
//!     ├── options.rs              # Option maps and typed accessors
//!     ├── comparison.rs           # if_less / if_greater ... value comparison
//!     ├── filters
//!     │   ├── common              # Block/Inline model + html5ever rendering
//!     │   ├── markdown            # comrak
//!     │   ├── textile             # parser.rs + charset handling
//!     │   ├── restructuredtext    # parser.rs + writer selection
//!     │   └── linebreaks
//!     └── lib.rs
//!
//! Filter Resolution
//!
//!     Every call to MarkupRegistry::apply resolves the filter anew:
//!
//!     - FilterChoice::Named(name): that filter, with only the caller's options.
//!     - FilterChoice::Passthrough: the text is returned untouched.
//!     - FilterChoice::Configured: the settings' default selection is read at call time. No
//!       configured name means pass-through; otherwise configured options are merged under the
//!       caller's (caller wins).
//!
//!     An unresolvable name is always an error listing the registered filters. Settings are never
//!     cached, so changing the configured default takes effect on the next call.
//!
//! Library Choices
//!
//!     Markdown is handed to comrak. There is no maintained Rust crate for Textile or
//!     reStructuredText, so those two are parsed here into a small shared model and serialized
//!     through html5ever, which keeps HTML escaping in one place.
//!
pub mod comparison;
pub mod error;
pub mod filter;
pub mod filters;
pub mod options;
pub mod registry;
pub mod settings;

pub use comparison::{compare_values, evaluate_tag, resolve_variable_or_literal, Comparison};
pub use error::{ComparisonError, FilterError, MarkupError, SettingsError};
pub use filter::{FnFilter, MarkupFilter};
pub use options::FilterOptions;
pub use registry::{FilterChoice, MarkupRegistry};
pub use settings::{DefaultSelection, Settings, StaticSettings};
