//! Configuration schema and loading.
//!
//! Settings come from an optional TOML file, overridden by `LINER_NOTES__*`
//! environment variables, with struct defaults for everything left unset.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
