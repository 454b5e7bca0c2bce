//! Configuration and shell state for the Lumina sign-in gate.

pub mod config;
pub mod keyfile;
pub mod shell;

pub use config::{DEFAULT_DATABASE_FILE, GateConfig, decode_key_bytes, encode_key_bytes};
pub use keyfile::{read_signing_key, write_signing_key};
pub use shell::{SHELL_FILE, ShellState, ShellStore};
