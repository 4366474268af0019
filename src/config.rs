//! Profile CRUD over the credential store.
//!
//! A profile is a JSON object mapping environment-variable names to values,
//! persisted verbatim in the credential store under the profile's name. The
//! `__meta__` entry tracks the known profile names; the first entry in that
//! list is the current (default) profile.

use std::collections::BTreeMap;
use std::env;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::editor;
use crate::error::{Result, SecretsError};
use crate::shell;
use crate::store::CredentialStore;

// =============================================================================
// Constants
// =============================================================================

/// Environment variable selecting the starting profile.
pub const PROFILE_ENV: &str = "DEVENV_SECRETS_PROFILE";

/// Environment variable holding the path of the JSON seed template.
pub const TEMPLATE_ENV: &str = "DEVENV_SECRETS_TEMPLATE";

/// Store key for the profile list.
const META_KEY: &str = "__meta__";

/// Profile name used when nothing else selects one.
const FALLBACK_PROFILE: &str = "default";

// =============================================================================
// Metadata
// =============================================================================

/// The `__meta__` record: every known profile name, current one first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub profiles: Vec<String>,
}

// =============================================================================
// Edit Outcome
// =============================================================================

/// What happened to an edited profile value after the editor round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Valid JSON, identical to what was there before.
    Unchanged,
    /// Valid JSON, different from what was there before.
    Changed,
    /// Not valid JSON; the raw text was persisted for a re-edit.
    Invalid(String),
}

// =============================================================================
// Config
// =============================================================================

/// Profile state plus the injected credential store.
///
/// Construction resolves the effective profile, initializes the `__meta__`
/// record on first use, and seeds the profile from the template when its
/// store entry is missing.
pub struct Config<S: CredentialStore> {
    store: S,
    current_profile: String,
    profile_data: BTreeMap<String, String>,
}

impl<S: CredentialStore> Config<S> {
    /// Resolve the effective profile and load its data.
    ///
    /// Profile resolution order: explicit `profile` argument, then
    /// `DEVENV_SECRETS_PROFILE`, then the first entry of the stored
    /// metadata, then `"default"`. A profile value that fails to parse as a
    /// JSON string map degrades to an empty map rather than failing
    /// construction.
    pub fn new(store: S, profile: Option<&str>) -> Result<Self> {
        let current_profile = resolve_profile(&store, profile)?;

        if store.find(META_KEY)?.is_none() {
            let meta = Meta {
                profiles: vec![current_profile.clone()],
            };
            store.set(META_KEY, &serde_json::to_string_pretty(&meta)?)?;
        }

        let raw = match store.find(&current_profile)? {
            Some(raw) => raw,
            None => {
                let template = read_template()?;
                store.set(&current_profile, &template)?;
                template
            }
        };
        let profile_data = serde_json::from_str(&raw).unwrap_or_default();

        Ok(Self {
            store,
            current_profile,
            profile_data,
        })
    }

    /// Name of the profile this invocation operates on.
    pub fn current_profile(&self) -> &str {
        &self.current_profile
    }

    /// The loaded key/value mapping of the current profile.
    pub fn profile_data(&self) -> &BTreeMap<String, String> {
        &self.profile_data
    }

    /// Load the metadata record, initializing it if absent.
    pub fn meta(&self) -> Result<Meta> {
        match self.store.find(META_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(SecretsError::CorruptMeta),
            None => {
                let meta = Meta {
                    profiles: vec![self.current_profile.clone()],
                };
                self.save_meta(&meta)?;
                Ok(meta)
            }
        }
    }

    fn save_meta(&self, meta: &Meta) -> Result<()> {
        self.store.set(META_KEY, &serde_json::to_string_pretty(meta)?)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Edit a profile (default: the current one) in the user's editor.
    ///
    /// The stored value (or the template, for a profile with no entry yet)
    /// seeds a temp file handed to `$EDITOR`. Whatever comes back is saved;
    /// invalid JSON is reported on stderr with a request to re-edit, and a
    /// changed valid value prints the activation tip.
    pub fn edit(&self, profile: Option<&str>) -> Result<()> {
        let name = profile.unwrap_or(&self.current_profile);

        let seed = match self.store.find(name)? {
            Some(raw) => raw,
            None => read_template()?,
        };

        let edited = editor::edit_text(&seed, ".json")?;

        match self.store_edited(name, &seed, &edited)? {
            EditOutcome::Invalid(parse_err) => {
                eprintln!("{parse_err}");
                eprintln!("Could not deserialize new data, re-edit");
            }
            EditOutcome::Changed => {
                let switch_to = (name != self.current_profile).then_some(name);
                print_activation_tip(switch_to);
            }
            EditOutcome::Unchanged => {}
        }
        Ok(())
    }

    /// Persist an edited profile value and classify the result.
    ///
    /// The value is saved in every case; invalid JSON must not lose the
    /// user's edits. Split from [`edit`](Self::edit) so the save/report
    /// logic is exercised without spawning an editor.
    pub fn store_edited(&self, name: &str, seed: &str, edited: &str) -> Result<EditOutcome> {
        self.store.set(name, edited)?;
        match serde_json::from_str::<serde_json::Value>(edited) {
            Err(err) => Ok(EditOutcome::Invalid(err.to_string())),
            Ok(_) if edited != seed => Ok(EditOutcome::Changed),
            Ok(_) => Ok(EditOutcome::Unchanged),
        }
    }

    /// Make `name` the default profile by moving it to the metadata front.
    ///
    /// Unknown names are seeded from the template and registered first.
    pub fn switch(&self, name: &str) -> Result<()> {
        let mut meta = self.meta()?;

        if !meta.profiles.iter().any(|p| p == name) {
            let template = read_template()?;
            self.store.set(name, &template)?;
            meta.profiles.push(name.to_string());
        }

        meta.profiles.retain(|p| p != name);
        meta.profiles.insert(0, name.to_string());
        self.save_meta(&meta)?;

        print_activation_tip(None);
        Ok(())
    }

    /// Delete a non-current profile from metadata and the store.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut meta = self.meta()?;
        let current = meta.profiles.first().cloned().unwrap_or_default();

        if name == current {
            return Err(SecretsError::DeleteCurrentProfile);
        }
        if !meta.profiles.iter().any(|p| p == name) {
            return Err(SecretsError::NoSuchProfile(name.to_string()));
        }

        meta.profiles.retain(|p| p != name);
        self.save_meta(&meta)?;
        self.store.delete(name)?;
        Ok(())
    }

    /// Duplicate `src`'s raw stored value under `target`.
    ///
    /// The target is registered in metadata when new. Copying over the
    /// current profile is refused.
    pub fn copy(&self, src: &str, target: &str) -> Result<()> {
        let mut meta = self.meta()?;

        if !meta.profiles.iter().any(|p| p == src) {
            return Err(SecretsError::NoSuchProfile(src.to_string()));
        }
        let current = meta.profiles.first().cloned().unwrap_or_default();
        if target == current {
            return Err(SecretsError::CopyOntoCurrentProfile(target.to_string()));
        }

        let value = self
            .store
            .find(src)?
            .ok_or_else(|| SecretsError::NoSuchProfile(src.to_string()))?;

        if !meta.profiles.iter().any(|p| p == target) {
            meta.profiles.push(target.to_string());
        }
        self.store.set(target, &value)?;
        self.save_meta(&meta)?;
        Ok(())
    }

    /// Shell statements exporting the current profile's variables.
    ///
    /// `DEVENV_SECRETS_PROFILE` is seeded with the current profile name and
    /// the profile's own entries merged over it. Each variable emits two
    /// lines in key-sorted order: `KEY=<quoted value>` then `export KEY`,
    /// ready for `eval "$(secrets export)"`.
    pub fn export_lines(&self) -> Vec<String> {
        let mut vars = BTreeMap::new();
        vars.insert(PROFILE_ENV.to_string(), self.current_profile.clone());
        vars.extend(self.profile_data.clone());

        vars.iter()
            .flat_map(|(key, value)| {
                [
                    format!("{key}={}", shell::quote(value)),
                    format!("export {key}"),
                ]
            })
            .collect()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn resolve_profile<S: CredentialStore>(store: &S, explicit: Option<&str>) -> Result<String> {
    if let Some(name) = explicit {
        return Ok(name.to_string());
    }
    if let Ok(name) = env::var(PROFILE_ENV) {
        return Ok(name);
    }
    match store.find(META_KEY)? {
        Some(raw) => {
            let meta: Meta = serde_json::from_str(&raw).map_err(SecretsError::CorruptMeta)?;
            Ok(meta
                .profiles
                .first()
                .cloned()
                .unwrap_or_else(|| FALLBACK_PROFILE.to_string()))
        }
        None => Ok(FALLBACK_PROFILE.to_string()),
    }
}

fn read_template() -> Result<String> {
    let path = env::var(TEMPLATE_ENV).map_err(|_| SecretsError::TemplateUnset)?;
    fs::read_to_string(&path).map_err(|source| SecretsError::TemplateRead { path, source })
}

fn print_activation_tip(switch_to: Option<&str>) {
    let prefix = match switch_to {
        Some(name) => format!("  secrets switch {name} && "),
        None => "  ".to_string(),
    };
    eprint!(
        "To activate your changes, run:\n\
         \n\
         {prefix}eval \"$(secrets export)\"\n\
         \n\
         Or exit and reenter the devenv shell\n"
    );
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support;
    use std::io::Write;

    const TEMPLATE: &str = r#"{"MYSECRET": "secret", "MYSECRET2": "secret2"}"#;

    fn store_with(meta_names: &[&str], profiles: &[(&str, &str)]) -> MemoryStore {
        let store = MemoryStore::new();
        let meta = Meta {
            profiles: meta_names.iter().map(|s| s.to_string()).collect(),
        };
        store
            .set(META_KEY, &serde_json::to_string(&meta).unwrap())
            .unwrap();
        for (name, value) in profiles {
            store.set(name, value).unwrap();
        }
        store
    }

    fn template_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_construct_loads_existing_profile() {
        let store = store_with(&["work"], &[("work", r#"{"A": "1"}"#)]);
        let config = Config::new(store, Some("work")).unwrap();

        assert_eq!(config.current_profile(), "work");
        assert_eq!(
            config.profile_data().get("A").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_construct_seeds_missing_profile_from_template() {
        let _guard = test_support::env_guard();
        let file = template_file(TEMPLATE);
        test_support::set_var(TEMPLATE_ENV, file.path().to_str().unwrap());

        let store = MemoryStore::new();
        let config = Config::new(store.clone(), Some("fresh")).unwrap();

        // Seeded verbatim, registered as the sole known profile.
        assert_eq!(store.find("fresh").unwrap().as_deref(), Some(TEMPLATE));
        assert_eq!(config.meta().unwrap().profiles, vec!["fresh"]);
        assert_eq!(
            config.profile_data().get("MYSECRET").map(String::as_str),
            Some("secret")
        );
    }

    #[test]
    fn test_construct_env_override_selects_profile() {
        let _guard = test_support::env_guard();
        let file = template_file(TEMPLATE);
        test_support::set_var(TEMPLATE_ENV, file.path().to_str().unwrap());
        test_support::set_var(PROFILE_ENV, "staging");

        let config = Config::new(MemoryStore::new(), None).unwrap();
        assert_eq!(config.current_profile(), "staging");

        test_support::remove_var(PROFILE_ENV);
    }

    #[test]
    fn test_construct_falls_back_to_default_name() {
        let _guard = test_support::env_guard();
        test_support::remove_var(PROFILE_ENV);
        let file = template_file(TEMPLATE);
        test_support::set_var(TEMPLATE_ENV, file.path().to_str().unwrap());

        let config = Config::new(MemoryStore::new(), None).unwrap();
        assert_eq!(config.current_profile(), "default");
    }

    #[test]
    fn test_construct_prefers_stored_default() {
        let _guard = test_support::env_guard();
        test_support::remove_var(PROFILE_ENV);

        let store = store_with(&["staging", "prod"], &[("staging", "{}")]);
        let config = Config::new(store, None).unwrap();
        assert_eq!(config.current_profile(), "staging");
    }

    #[test]
    fn test_construct_malformed_profile_degrades_to_empty() {
        let store = store_with(&["work"], &[("work", "not json")]);
        let config = Config::new(store, Some("work")).unwrap();
        assert!(config.profile_data().is_empty());
    }

    // =========================================================================
    // Export
    // =========================================================================

    #[test]
    fn test_export_lines_worked_example() {
        let store = store_with(&["profile"], &[("profile", TEMPLATE)]);
        let config = Config::new(store, Some("profile")).unwrap();

        assert_eq!(
            config.export_lines(),
            vec![
                "DEVENV_SECRETS_PROFILE=profile",
                "export DEVENV_SECRETS_PROFILE",
                "MYSECRET=secret",
                "export MYSECRET",
                "MYSECRET2=secret2",
                "export MYSECRET2",
            ]
        );
    }

    #[test]
    fn test_export_quotes_unsafe_values() {
        let store = store_with(&["work"], &[("work", r#"{"GREETING": "hello world"}"#)]);
        let config = Config::new(store, Some("work")).unwrap();

        let lines = config.export_lines();
        assert!(lines.contains(&"GREETING='hello world'".to_string()));
    }

    #[test]
    fn test_export_profile_entry_overrides_profile_var() {
        let store = store_with(
            &["work"],
            &[("work", r#"{"DEVENV_SECRETS_PROFILE": "spoofed"}"#)],
        );
        let config = Config::new(store, Some("work")).unwrap();

        let lines = config.export_lines();
        assert_eq!(lines[0], "DEVENV_SECRETS_PROFILE=spoofed");
    }

    // =========================================================================
    // Edit
    // =========================================================================

    #[test]
    fn test_store_edited_unchanged() {
        let seed = r#"{"A": "1"}"#;
        let store = store_with(&["work"], &[("work", seed)]);
        let config = Config::new(store.clone(), Some("work")).unwrap();

        let outcome = config.store_edited("work", seed, seed).unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(store.find("work").unwrap().as_deref(), Some(seed));
    }

    #[test]
    fn test_store_edited_changed() {
        let seed = r#"{"A": "1"}"#;
        let edited = r#"{"A": "2"}"#;
        let store = store_with(&["work"], &[("work", seed)]);
        let config = Config::new(store.clone(), Some("work")).unwrap();

        let outcome = config.store_edited("work", seed, edited).unwrap();
        assert_eq!(outcome, EditOutcome::Changed);
        assert_eq!(store.find("work").unwrap().as_deref(), Some(edited));
    }

    #[test]
    fn test_store_edited_invalid_persists_raw() {
        let seed = r#"{"A": "1"}"#;
        let store = store_with(&["work"], &[("work", seed)]);
        let config = Config::new(store.clone(), Some("work")).unwrap();

        let outcome = config.store_edited("work", seed, "{oops").unwrap();
        assert!(matches!(outcome, EditOutcome::Invalid(_)));
        assert_eq!(store.find("work").unwrap().as_deref(), Some("{oops"));
    }

    #[test]
    #[cfg(unix)]
    fn test_edit_with_noop_editor_keeps_value() {
        let _guard = test_support::env_guard();
        test_support::set_var("EDITOR", "true");

        let seed = r#"{"A": "1"}"#;
        let store = store_with(&["work"], &[("work", seed)]);
        let config = Config::new(store.clone(), Some("work")).unwrap();

        config.edit(None).unwrap();
        assert_eq!(store.find("work").unwrap().as_deref(), Some(seed));
    }

    // =========================================================================
    // Switch
    // =========================================================================

    #[test]
    fn test_switch_moves_profile_to_front() {
        let store = store_with(&["a", "b"], &[("a", "{}"), ("b", "{}")]);
        let config = Config::new(store, Some("a")).unwrap();

        config.switch("b").unwrap();
        assert_eq!(config.meta().unwrap().profiles, vec!["b", "a"]);
    }

    #[test]
    fn test_switch_seeds_unknown_profile() {
        let _guard = test_support::env_guard();
        let file = template_file(TEMPLATE);
        test_support::set_var(TEMPLATE_ENV, file.path().to_str().unwrap());

        let store = store_with(&["a"], &[("a", "{}")]);
        let config = Config::new(store.clone(), Some("a")).unwrap();

        config.switch("newbie").unwrap();
        assert_eq!(config.meta().unwrap().profiles, vec!["newbie", "a"]);
        assert_eq!(store.find("newbie").unwrap().as_deref(), Some(TEMPLATE));
    }

    // =========================================================================
    // Delete
    // =========================================================================

    #[test]
    fn test_delete_current_rejected() {
        let store = store_with(&["a", "b"], &[("a", "{}"), ("b", "{}")]);
        let config = Config::new(store, Some("a")).unwrap();

        let err = config.delete("a").unwrap_err();
        assert!(matches!(err, SecretsError::DeleteCurrentProfile));
        assert_eq!(config.meta().unwrap().profiles, vec!["a", "b"]);
    }

    #[test]
    fn test_delete_unknown_rejected() {
        let store = store_with(&["a"], &[("a", "{}")]);
        let config = Config::new(store, Some("a")).unwrap();

        let err = config.delete("ghost").unwrap_err();
        assert!(matches!(err, SecretsError::NoSuchProfile(_)));
    }

    #[test]
    fn test_delete_removes_metadata_and_entry() {
        let store = store_with(&["a", "b"], &[("a", "{}"), ("b", "{}")]);
        let config = Config::new(store.clone(), Some("a")).unwrap();

        config.delete("b").unwrap();
        assert_eq!(config.meta().unwrap().profiles, vec!["a"]);
        assert_eq!(store.find("b").unwrap(), None);
    }

    // =========================================================================
    // Copy
    // =========================================================================

    #[test]
    fn test_copy_unknown_source_rejected() {
        let store = store_with(&["a"], &[("a", "{}")]);
        let config = Config::new(store, Some("a")).unwrap();

        let err = config.copy("ghost", "c").unwrap_err();
        assert!(matches!(err, SecretsError::NoSuchProfile(_)));
    }

    #[test]
    fn test_copy_onto_current_rejected() {
        let store = store_with(&["a", "b"], &[("a", "{}"), ("b", "{}")]);
        let config = Config::new(store, Some("a")).unwrap();

        let err = config.copy("b", "a").unwrap_err();
        assert!(matches!(err, SecretsError::CopyOntoCurrentProfile(_)));
    }

    #[test]
    fn test_copy_duplicates_raw_value_and_registers_target() {
        // Raw duplication: the stored bytes move as-is, valid JSON or not.
        let store = store_with(&["a", "b"], &[("a", "{}"), ("b", "not json")]);
        let config = Config::new(store.clone(), Some("a")).unwrap();

        config.copy("b", "c").unwrap();
        assert_eq!(store.find("c").unwrap().as_deref(), Some("not json"));
        assert_eq!(config.meta().unwrap().profiles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_copy_existing_target_not_duplicated_in_metadata() {
        let store = store_with(&["a", "b", "c"], &[("a", "{}"), ("b", "{}"), ("c", "{}")]);
        let config = Config::new(store, Some("a")).unwrap();

        config.copy("b", "c").unwrap();
        assert_eq!(config.meta().unwrap().profiles, vec!["a", "b", "c"]);
    }
}
