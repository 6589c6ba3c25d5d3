//! Tiered value resolution and user edits
//!
//! A lookup walks record, session and global tiers in that order and stops
//! at the first tier that holds the key, even when the value there is empty.
//! A key held by no tier resolves to the empty string.

use tracing::debug;

use super::flat::KeyValues;
use super::keys::ConfigKey;
use super::tier::{ConfigTier, TierKind};
use crate::prompt::{PromptError, Prompter};

/// Leading character that turns an edit into an append
pub const APPEND_SENTINEL: char = '+';

/// Resolver over the three configuration tiers
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    record: ConfigTier,
    session: ConfigTier,
    global: ConfigTier,
}

impl ConfigResolver {
    /// Build a resolver with an empty record tier
    pub fn new(session: ConfigTier, global: ConfigTier) -> Self {
        Self {
            record: ConfigTier::empty(TierKind::Record),
            session,
            global,
        }
    }

    /// Resolver with all three tiers empty
    pub fn empty() -> Self {
        Self::new(
            ConfigTier::empty(TierKind::Session),
            ConfigTier::empty(TierKind::Global),
        )
    }

    pub fn with_record(mut self, record: ConfigTier) -> Self {
        self.record = record;
        self
    }

    /// Replace the record tier with the values of the next dataset
    pub fn set_record_values(&mut self, values: KeyValues) {
        self.record = ConfigTier::from_values(TierKind::Record, values);
    }

    pub fn set_session(&mut self, session: ConfigTier) {
        self.session = session;
    }

    pub fn record(&self) -> &ConfigTier {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut ConfigTier {
        &mut self.record
    }

    pub fn session(&self) -> &ConfigTier {
        &self.session
    }

    pub fn global(&self) -> &ConfigTier {
        &self.global
    }

    /// Effective value of `key`, or `""` when no tier holds it
    pub fn resolve(&self, key: ConfigKey) -> String {
        self.resolve_str(key.as_str())
    }

    /// Same as [`resolve`](Self::resolve) for a raw key name
    pub fn resolve_str(&self, key: &str) -> String {
        self.lookup(key)
            .map(|(_, value)| value.to_string())
            .unwrap_or_default()
    }

    /// Value of `key` together with the tier that supplied it
    pub fn lookup(&self, key: &str) -> Option<(TierKind, &str)> {
        [&self.record, &self.session, &self.global]
            .into_iter()
            .find_map(|tier| tier.get(key).map(|v| (tier.kind(), v)))
    }

    /// Ask the user for a new value of `key`, starting from its resolved value
    pub fn edit_value(
        &self,
        prompter: &mut dyn Prompter,
        prompt: &str,
        key: ConfigKey,
    ) -> Result<String, PromptError> {
        let current = self.resolve(key);
        edit_with_current(prompter, prompt, key, &current)
    }

    /// Like [`edit_value`](Self::edit_value), but starts from `fallback`
    /// when `key` resolves to nothing
    pub fn edit_value_or(
        &self,
        prompter: &mut dyn Prompter,
        prompt: &str,
        key: ConfigKey,
        fallback: &str,
    ) -> Result<String, PromptError> {
        let resolved = self.resolve(key);
        let current = if resolved.trim().is_empty() {
            fallback.to_string()
        } else {
            resolved
        };
        edit_with_current(prompter, prompt, key, &current)
    }
}

/// Prompt with an explicit current value.
///
/// The key name stands in for an empty current value in the prompt only;
/// it never becomes the result.
pub fn edit_with_current(
    prompter: &mut dyn Prompter,
    prompt: &str,
    key: ConfigKey,
    current: &str,
) -> Result<String, PromptError> {
    let current = current.trim();
    let shown = if current.is_empty() { key.as_str() } else { current };
    let input = prompter.ask(prompt, shown)?;
    let value = apply_edit(current, &input);
    debug!(key = %key, value = %value, "edited value");
    Ok(value)
}

/// Merge user input into the current value.
///
/// - blank input keeps `current`
/// - `+rest` appends `rest` verbatim
/// - anything else replaces `current` (surrounding whitespace trimmed)
pub fn apply_edit(current: &str, input: &str) -> String {
    let trimmed = input.trim_start();
    if trimmed.trim_end().is_empty() {
        return current.to_string();
    }
    match trimmed.strip_prefix(APPEND_SENTINEL) {
        Some(rest) => format!("{}{}", current, rest),
        None => trimmed.trim_end().to_string(),
    }
}
