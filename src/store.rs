//! Credential store abstraction.
//!
//! The OS keychain is the sole persistence layer. Everything the tool knows
//! lives under one service namespace, keyed by profile name (plus the
//! `__meta__` bookkeeping entry). The store is injected into [`Config`] at
//! construction; the keychain-backed implementation is wired up in `main`.
//!
//! [`Config`]: crate::config::Config

use crate::error::Result;

/// Service namespace under which all entries are stored.
pub const SERVICE_NAME: &str = "devenv-secrets";

/// Key→string storage addressed by (service, key).
///
/// `find` returns `Ok(None)` both for a missing entry and for a store that
/// was never initialized, so callers branch instead of catching errors.
pub trait CredentialStore {
    /// Look up the value stored under `key`.
    fn find(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the entry stored under `key`.
    fn delete(&self, key: &str) -> Result<()>;
}

// =============================================================================
// OS Keychain
// =============================================================================

/// Store backed by the OS keychain via the `keyring` crate.
///
/// - macOS: Keychain
/// - Linux: Secret Service (GNOME Keyring / KWallet)
/// - Windows: Credential Manager
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Keychain store under the tool's fixed service namespace.
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Keychain store under a custom service namespace.
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn find(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        // keyring 3.x uses delete_credential instead of delete_password
        self.entry(key)?.delete_credential()?;
        Ok(())
    }
}

// =============================================================================
// In-Memory Store (tests)
// =============================================================================

/// In-memory store for the test suite. Clones share the same map, so a test
/// can keep a handle to inspect what [`Config`] wrote.
///
/// [`Config`]: crate::config::Config
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    entries: std::rc::Rc<std::cell::RefCell<std::collections::HashMap<String, String>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl CredentialStore for MemoryStore {
    fn find(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
