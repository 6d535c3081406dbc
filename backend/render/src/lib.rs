pub mod error;
pub mod output;
pub mod placeholder;

pub use error::{RenderError, Result};
pub use output::{properties_text, validate_profiles, OutputFormat, RenderOptions, Renderer};
pub use placeholder::{referenced_keys, resolve_placeholders, unresolved_keys, value_text, MAX_PASSES};
