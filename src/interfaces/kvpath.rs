use std::path::PathBuf;

use once_cell::sync::Lazy;

use crate::constants::defaults;
use crate::helpers::base_path;

pub static SQLITE_STORE: Lazy<PathBuf> = Lazy::new(|| base_path::DATA_DIR.join(defaults::KVS_DB_PATH));
