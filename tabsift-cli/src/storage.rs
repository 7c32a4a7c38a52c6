//! File-backed storage sink: one pretty-printed JSON document per
//! canonical dataset, under `<out_dir>/<owner>/`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tabsift_classify::{CanonicalRecords, InsertReceipt, StorageSink};

pub struct JsonDirSink {
    root: PathBuf,
}

impl JsonDirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StorageSink for JsonDirSink {
    fn insert(
        &mut self,
        owner: &str,
        file_name: &str,
        records: &CanonicalRecords,
    ) -> Result<InsertReceipt> {
        let dir = self.root.join(owner);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset");
        let path = dir.join(format!("{}-{}.json", records.kind(), stem));

        let json = serde_json::to_string_pretty(records).context("serialize dataset")?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;

        Ok(InsertReceipt {
            dataset_kind: records.kind(),
            records_written: records.record_count(),
            destination: path.display().to_string(),
        })
    }
}
