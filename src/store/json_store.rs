use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::StoreError;
use crate::store::kv::KeyValueStore;
use crate::store::schema::{
    ACHIEVEMENTS_KEY, AchievementData, EXPORT_VERSION, ExportData, STATS_KEY, StatsData,
};

const PERSISTED_KEYS: [&str; 2] = [STATS_KEY, ACHIEVEMENTS_KEY];

/// One pretty-printed `<key>.json` file per key under the data directory.
pub struct JsonStore {
    base_dir: PathBuf,
}

fn write_synced(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pressure");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get_raw(key) {
            Ok(Some(content)) => serde_json::from_str(&content).unwrap_or_default(),
            _ => T::default(),
        }
    }

    /// Bundle config and all persisted data into one document.
    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            pressure_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            stats: self.load::<StatsData>(STATS_KEY),
            achievements: self.load::<AchievementData>(ACHIEVEMENTS_KEY),
        }
    }

    /// Replace all persisted data with `data`, all or nothing.
    ///
    /// Every file is staged to `.tmp` first. Originals are then moved to
    /// `.bak` and the staged files renamed into place; any failure restores
    /// the backups. Backups are removed on success.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.pressure_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.pressure_export_version,
                EXPORT_VERSION
            );
        }

        let files: Vec<(&str, String)> = vec![
            (STATS_KEY, serde_json::to_string_pretty(&data.stats)?),
            (
                ACHIEVEMENTS_KEY,
                serde_json::to_string_pretty(&data.achievements)?,
            ),
        ];

        let mut staged: Vec<PathBuf> = Vec::new();
        for (key, json) in &files {
            let tmp_path = self.file_path(key).with_extension("json.tmp");
            match write_synced(&tmp_path, json) {
                Ok(()) => staged.push(tmp_path),
                Err(e) => {
                    for tmp in &staged {
                        let _ = fs::remove_file(tmp);
                    }
                    bail!("Import failed during staging: {e}");
                }
            }
        }

        // (final, backup, had_original)
        let mut committed: Vec<(PathBuf, PathBuf, bool)> = Vec::new();
        let rollback = |committed: &[(PathBuf, PathBuf, bool)]| {
            for (final_path, bak_path, had_original) in committed {
                if *had_original {
                    let _ = fs::rename(bak_path, final_path);
                } else {
                    let _ = fs::remove_file(final_path);
                }
            }
        };

        for (i, (key, _)) in files.iter().enumerate() {
            let final_path = self.file_path(key);
            let bak_path = final_path.with_extension("json.bak");
            let had_original = final_path.exists();

            if had_original && let Err(e) = fs::rename(&final_path, &bak_path) {
                rollback(&committed);
                for tmp in &staged {
                    let _ = fs::remove_file(tmp);
                }
                bail!("Import failed during commit (backup): {e}");
            }

            if let Err(e) = fs::rename(&staged[i], &final_path) {
                rollback(&[(final_path, bak_path, had_original)]);
                rollback(&committed);
                for tmp in &staged[i..] {
                    let _ = fs::remove_file(tmp);
                }
                bail!("Import failed during commit (rename): {e}");
            }

            committed.push((final_path, bak_path, had_original));
        }

        for (_, bak_path, had_original) in &committed {
            if *had_original {
                let _ = fs::remove_file(bak_path);
            }
        }
        log::info!("imported data into {}", self.base_dir.display());
        Ok(())
    }

    /// Remove `.bak` files left by an interrupted import. Returns whether any
    /// were found.
    pub fn check_interrupted_import(&self) -> bool {
        let mut found = false;
        for key in PERSISTED_KEYS {
            let bak_path = self.file_path(key).with_extension("json.bak");
            if bak_path.exists() {
                found = true;
                let _ = fs::remove_file(&bak_path);
            }
        }
        found
    }
}

impl KeyValueStore for JsonStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.file_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("tmp");
        write_synced(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.file_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
