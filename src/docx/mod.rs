//! WordprocessingML part handling.
//!
//! Settings inspection and rewriting, body concatenation for the default
//! merge engine, and visible-text extraction.

pub mod body;
pub mod settings;
pub mod text;

pub use body::{append_bodies, extract_body, BodyFragment};
pub use settings::{CompatSettings, MODERN_COMPAT_VERSION};
pub use text::document_text;
