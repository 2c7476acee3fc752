//! g1launch configuration layer
//!
//! All environment reads go through this module; callers use the schema
//! structs instead of `std::env::var`.
//!
//! - `loader`: env_or, env_optional, env_bool, `.env` parsing
//! - `schema`: LayoutConfig, LaunchConfig, ObservabilityConfig
//! - `env_keys`: key constants and aliases

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{
    env_bool, env_list, env_optional, env_or, load_dotenv_from_dir, parse_dotenv, DotenvVars,
};
pub use schema::{LaunchConfig, LayoutConfig, ObservabilityConfig};
