//! Saved connection presets.
//!
//! All presets live in one storage slot as a JSON array, read once when the
//! store opens and rewritten whole on every change.

use reverb_tester_shared::{AuthConfig, ConnectionConfig, Preset, PresetError};

use crate::storage::Storage;

pub const PRESETS_KEY: &str = "reverb-tester-presets";

#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    storage: Option<Storage>,
    presets: Vec<Preset>,
}

impl PresetStore {
    /// Load presets from `storage`. Without storage, presets only live in memory.
    pub fn open(storage: Option<Storage>) -> Self {
        let presets = storage
            .as_ref()
            .and_then(|s| s.load::<Vec<Preset>>(PRESETS_KEY))
            .unwrap_or_default();
        crate::log_debug!("presets: loaded {} preset(s)", presets.len());
        Self { storage, presets }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn save(
        &mut self,
        name: &str,
        connection: ConnectionConfig,
        auth: AuthConfig,
    ) -> Result<Preset, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::BlankName);
        }
        let preset = Preset::new(name, connection, auth);
        self.presets.push(preset.clone());
        self.persist();
        Ok(preset)
    }

    pub fn delete(&mut self, id: &str) -> Result<Preset, PresetError> {
        let index = self
            .presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PresetError::NotFound(id.to_string()))?;
        let removed = self.presets.remove(index);
        self.persist();
        Ok(removed)
    }

    fn persist(&self) {
        if let Some(storage) = &self.storage {
            if !storage.save(PRESETS_KEY, &self.presets) {
                crate::log_warn!("presets: failed to write {}", storage.root().display());
            }
        }
    }
}
