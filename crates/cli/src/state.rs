//! Persisted collection state
//!
//! JSON document holding the collection metadata and the engine record.

use anyhow::{bail, Context, Result};
use scalar_tariff::EngineSnapshot;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    pub name: String,
    pub symbol: String,
    pub engine: EngineSnapshot,
}

impl StateFile {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to encode state")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Write a fresh state file, refusing to replace an existing record
    /// unless `overwrite` is set.
    pub fn create(&self, path: &Path, overwrite: bool) -> Result<()> {
        if path.exists() && !overwrite {
            bail!(
                "state file {} already exists (use --force to replace it)",
                path.display()
            );
        }
        self.save(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalar_tariff::{TariffEngine, TariffParams};
    use scalar_types::AccountId;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let venue = AccountId::from_label("venue");
        let mut params = TariffParams::with_owner(AccountId::from_label("owner"));
        params.venues.insert(venue);
        let mut engine = TariffEngine::new(params).unwrap();
        engine.record_trades(&venue, 2_500).unwrap();

        let state = StateFile {
            name: "Scalar".into(),
            symbol: "SCL".into(),
            engine: engine.snapshot(),
        };
        state.save(&path).unwrap();

        let loaded = StateFile::load(&path).unwrap();
        assert_eq!(loaded, state);
        let restored = TariffEngine::restore(loaded.engine).unwrap();
        assert_eq!(restored.credits_earned(), 2);
    }

    #[test]
    fn create_refuses_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let owner = AccountId::from_label("owner");

        let venue = AccountId::from_label("venue");
        let mut params = TariffParams::with_owner(owner);
        params.venues.insert(venue);
        let mut engine = TariffEngine::new(params.clone()).unwrap();
        engine.record_trades(&venue, 3_000).unwrap();
        let live = StateFile {
            name: "Scalar".into(),
            symbol: "SCL".into(),
            engine: engine.snapshot(),
        };
        live.create(&path, false).unwrap();

        let fresh = StateFile {
            engine: TariffEngine::new(params).unwrap().snapshot(),
            ..live.clone()
        };
        let err = fresh.create(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(StateFile::load(&path).unwrap().engine.trade_count, 3_000);

        fresh.create(&path, true).unwrap();
        assert_eq!(StateFile::load(&path).unwrap().engine.trade_count, 0);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = StateFile::load(Path::new("/nonexistent/state.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/state.json"));
    }
}
