pub mod backend;
pub mod config;
pub mod errors;
pub mod logging;
pub mod scout;
pub mod util;
