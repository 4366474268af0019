//! devenv-secrets Library
//!
//! Named secret profiles stored in the OS keychain.
//!
//! # Features
//!
//! - Store sets of environment variables as named profiles
//! - Switch between profiles, the current one is the default
//! - Edit profile JSON in `$EDITOR`, seed new profiles from a template
//! - Export a profile as shell `export` statements
//!
//! # Example
//!
//! ```no_run
//! use devenv_secrets::config::Config;
//! use devenv_secrets::store::KeyringStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Resolve the current profile from the keychain
//!     let config = Config::new(KeyringStore::new(), None)?;
//!     println!("current profile: {}", config.current_profile());
//!
//!     // Print eval-ready export statements
//!     for line in config.export_lines() {
//!         println!("{line}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod shell;
pub mod store;

// Re-exports for convenience
pub use config::Config;
pub use error::{Result, SecretsError};
pub use store::{CredentialStore, KeyringStore};
