//! # modbot-cli
//!
//! Argument parsing for the `modbot` binary.

pub mod cli;

pub use cli::{Cli, Commands};
