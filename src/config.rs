use crate::{error::ConfigError, planner::ScanOrder, timing::Speed};
use std::{collections::HashMap, fs, path::Path};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.txt";

const DEFAULT_CONFIG: &str = "\
# config.txt
# number of columns/rows in your grid
columns=24
rows=12

# speed: 1 = human-like (default), 2 = ~2x faster
speed=1

# scan_order:
#   1 = top->bottom then left->right  (column-major)
#   2 = left->right then top->bottom  (row-major)
#   3 = random
scan_order=1
";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    pub speed: Speed,
    pub scan_order: ScanOrder,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { columns: 24, rows: 12, speed: Speed::Human, scan_order: ScanOrder::ColumnMajor }
    }
}

impl GridConfig {
    /// Reads `key=value` lines over `base`. Unknown keys, comments and lines
    /// without `=` are skipped; a value that does not parse keeps the base
    /// value; everything is clamped to its range.
    pub fn parse(text: &str, base: &GridConfig) -> GridConfig {
        let mut loaded = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else { continue };
            loaded.insert(key.trim().to_lowercase(), value.trim().to_lowercase());
        }

        let setting = |name: &str, current: i64, min: i64, max: i64| -> i64 {
            loaded
                .get(name)
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(current)
                .clamp(min, max)
        };

        GridConfig {
            columns: setting("columns", base.columns as i64, 1, 9999) as u32,
            rows: setting("rows", base.rows as i64, 1, 9999) as u32,
            speed: Speed::from_setting(setting("speed", base.speed as i64, 1, 2) as u8),
            scan_order: ScanOrder::from_setting(setting("scan_order", base.scan_order as i64, 1, 3) as u8),
        }
    }

    /// Loads `path`, writing the commented default file first if it is missing.
    pub fn load_or_create(path: &Path, base: &GridConfig) -> Result<GridConfig, ConfigError> {
        if !path.exists() {
            fs::write(path, DEFAULT_CONFIG)
                .map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })?;
            info!("Created default config at {}", path.display());
        }

        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = GridConfig::parse(&text, base);
        info!(
            "Config loaded: columns={}, rows={}, speed={}, scan_order={}",
            config.columns, config.rows, config.speed as u8, config.scan_order as u8
        );
        Ok(config)
    }
}
