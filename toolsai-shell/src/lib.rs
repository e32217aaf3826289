//! Application shell for Tools-AI.
//!
//! Wires the license session and the credential resolver into one explicitly
//! constructed [`AppContext`] and provides the caller-side flows around them:
//! login-then-save, register-then-login, and the license gate in front of
//! the generation tools.

mod config;
mod context;

pub use config::{ShellConfig, CONFIG_FILE_NAME, DEFAULT_LICENSE_EXPIRY};
pub use context::{mask_credential, AppContext, GateError, SignUpError};
