//! Persisted-preferences seam.
//!
//! The storage itself lives outside the runtime.  The application only
//! guarantees that [`PreferenceStore::begin`] is called exactly once, before
//! the first component setup hook runs.

use cadence_types::CadenceError;

/// External persisted-preferences store.
pub trait PreferenceStore {
    /// Open the backing storage.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::Preferences`] when the storage cannot be
    /// opened.
    fn begin(&mut self) -> Result<(), CadenceError>;
}

/// Volatile store used by hosted builds and tests.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    begun: bool,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_begun(&self) -> bool {
        self.begun
    }
}

impl PreferenceStore for MemoryPreferences {
    fn begin(&mut self) -> Result<(), CadenceError> {
        self.begun = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_preferences_begin() {
        let mut prefs = MemoryPreferences::new();
        assert!(!prefs.is_begun());
        prefs.begin().unwrap();
        assert!(prefs.is_begun());
    }
}
