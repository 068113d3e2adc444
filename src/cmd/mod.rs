//! CLI command implementations.
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `serve`   | `Serve`          |
//! | `extract` | `Extract`        |
//! | `config`  | `Config`         |

pub mod config;
pub mod extract;
pub mod serve;

pub use config::cmd_config;
pub use extract::{ExtractOptions, cmd_extract};
pub use serve::cmd_serve;
