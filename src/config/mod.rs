//! Mock file configuration subsystem.
//!
//! # Data Flow
//! ```text
//! mock file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MockFile (validated, immutable)
//!     → schema.rs build() → Vec<MockResponses> / MockRouter
//! ```
//!
//! # Design Decisions
//! - All sections have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks
//! - Response values are kept as raw JSON and classified once at build

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_mock_file, parse_mock_file, ConfigError};
pub use schema::{LogFormat, MockConfig, MockFile, OneOrMany, RequestConfig, Settings, TargetConfig};
pub use validation::{validate_mock_file, ValidationError};
