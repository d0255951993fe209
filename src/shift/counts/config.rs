use std::path::{Path, PathBuf};

use crate::shift::counts::io::store::{DEFAULT_STORE_FILE, ShiftStore};
use crate::shift::counts::model::{ShiftDate, ShiftType};

/// Folder, under the base directory, holding one sub-folder per shift date.
pub const DEFAULT_EXPORTS_DIR: &str = "exports";

/// Prefix of every shift workbook file name.
pub const WORKBOOK_PREFIX: &str = "InboundPS_";

/// Locations the engine reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub exports_dir: PathBuf,
    pub store_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_base_dir(Path::new(""))
    }
}

impl EngineConfig {
    /// Places the exports folder and the store file under `base_dir`.
    pub fn with_base_dir(base_dir: &Path) -> Self {
        Self {
            exports_dir: base_dir.join(DEFAULT_EXPORTS_DIR),
            store_path: base_dir.join(DEFAULT_STORE_FILE),
        }
    }

    /// Workbook of one shift:
    /// `<exports>/<YYYY-MM-DD>/InboundPS_<Days|Nights><YYYY-MM-DD>.xlsx`.
    pub fn document_path(&self, date: ShiftDate, shift_type: ShiftType) -> PathBuf {
        let date = date.to_string();
        self.exports_dir
            .join(&date)
            .join(format!("{WORKBOOK_PREFIX}{}{date}.xlsx", shift_type.label()))
    }

    pub fn store(&self) -> ShiftStore {
        ShiftStore::new(&self.store_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_path_encodes_date_and_shift() {
        let config = EngineConfig::with_base_dir(Path::new("/data"));
        let date: ShiftDate = "2024-05-01".parse().unwrap();

        assert_eq!(
            config.document_path(date, ShiftType::Night),
            PathBuf::from("/data/exports/2024-05-01/InboundPS_Nights2024-05-01.xlsx")
        );
        assert_eq!(config.store().path(), Path::new("/data/shift_data.json"));
    }
}
