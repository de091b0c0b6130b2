//! Source definitions
//!
//! Describes HTTP endpoints that page through offset/limit query parameters,
//! loaded from YAML.
//!
//! # Example
//!
//! ```yaml
//! name: users
//! base_url: https://api.example.com
//! path: /v1/users
//! records_path: data
//! page_size: 25
//! headers:
//!   Authorization: "Bearer token"
//! ```

mod parser;
mod types;

pub use parser::{load_source, load_source_from_str, validate_source};
pub use types::SourceDefinition;
