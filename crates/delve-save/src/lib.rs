//! delve-save: Settings files and layout exports
//!
//! Reads generation settings from JSON and writes generated layouts as JSON,
//! optionally gzip compressed, behind a versioned header.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use delve_core::{GridCoord, LevelLayout, LevelSettings, SettingsError};

/// Current layout export format version
pub const LAYOUT_VERSION: u32 = 1;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Export and settings file errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Incompatible layout version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("Invalid layout file header")]
    InvalidHeader,
}

/// Layout file header for versioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutHeader {
    /// Magic identifier
    pub magic: String,
    /// Export format version
    pub version: u32,
    pub seed: u64,
    pub grid_size: GridCoord,
    pub rooms: usize,
    pub corridors: usize,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
}

impl LayoutHeader {
    const MAGIC: &'static str = "DLVL";

    pub fn new(layout: &LevelLayout) -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: LAYOUT_VERSION,
            seed: layout.seed(),
            grid_size: layout.grid_size(),
            rooms: layout.rooms(),
            corridors: layout.corridors(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.magic != Self::MAGIC {
            return Err(SaveError::InvalidHeader);
        }
        if self.version != LAYOUT_VERSION {
            return Err(SaveError::IncompatibleVersion {
                expected: LAYOUT_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

/// Complete layout file
#[derive(Debug, Deserialize)]
pub struct LayoutFile {
    pub header: LayoutHeader,
    pub layout: LevelLayout,
}

#[derive(Serialize)]
struct LayoutFileRef<'a> {
    header: LayoutHeader,
    layout: &'a LevelLayout,
}

#[derive(Deserialize)]
struct HeaderOnly {
    header: LayoutHeader,
}

/// Output encoding of a layout export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Pretty,
    Compact,
    Gzip,
}

impl ExportFormat {
    /// Gzip for `.gz` paths, pretty JSON otherwise
    pub fn for_path(path: &Path) -> Self {
        if path.extension().is_some_and(|e| e == "gz") {
            ExportFormat::Gzip
        } else {
            ExportFormat::Pretty
        }
    }
}

/// Write a layout with its header in the given format
pub fn export_layout(layout: &LevelLayout, path: impl AsRef<Path>, format: ExportFormat) -> Result<(), SaveError> {
    let path = path.as_ref();
    let file = LayoutFileRef {
        header: LayoutHeader::new(layout),
        layout,
    };
    let writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Pretty => serde_json::to_writer_pretty(writer, &file)?,
        ExportFormat::Compact => serde_json::to_writer(writer, &file)?,
        ExportFormat::Gzip => {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            serde_json::to_writer(&mut encoder, &file)?;
            encoder.finish()?.flush()?;
        }
    }
    info!("Exported layout with seed {} to {}", file.header.seed, path.display());
    Ok(())
}

/// Save a layout as pretty printed JSON
pub fn save_layout(layout: &LevelLayout, path: impl AsRef<Path>) -> Result<(), SaveError> {
    export_layout(layout, path, ExportFormat::Pretty)
}

/// Save a layout as compact JSON (no pretty printing)
pub fn save_layout_compact(layout: &LevelLayout, path: impl AsRef<Path>) -> Result<(), SaveError> {
    export_layout(layout, path, ExportFormat::Compact)
}

/// Save a layout as gzip compressed JSON
pub fn save_layout_gz(layout: &LevelLayout, path: impl AsRef<Path>) -> Result<(), SaveError> {
    export_layout(layout, path, ExportFormat::Gzip)
}

/// Read a file, transparently inflating gzip content
fn read_contents(path: &Path) -> Result<Vec<u8>, SaveError> {
    let file = File::open(path).map_err(|_| SaveError::NotFound(path.to_path_buf()))?;
    let mut raw = Vec::new();
    BufReader::new(file).read_to_end(&mut raw)?;
    if raw.starts_with(&GZIP_MAGIC) {
        debug!("Inflating gzip content of {}", path.display());
        let mut inflated = Vec::new();
        GzDecoder::new(raw.as_slice()).read_to_end(&mut inflated)?;
        return Ok(inflated);
    }
    Ok(raw)
}

/// Load a layout file, plain or gzip compressed
///
/// The random stream of the loaded layout restarts from its seed.
pub fn load_layout(path: impl AsRef<Path>) -> Result<LayoutFile, SaveError> {
    let contents = read_contents(path.as_ref())?;
    let file: LayoutFile = serde_json::from_slice(&contents)?;
    file.header.validate()?;
    Ok(file)
}

/// Load only the header from a layout file
pub fn load_header(path: impl AsRef<Path>) -> Result<LayoutHeader, SaveError> {
    let contents = read_contents(path.as_ref())?;
    let file: HeaderOnly = serde_json::from_slice(&contents)?;
    file.header.validate()?;
    Ok(file.header)
}

/// Load and validate generation settings from a JSON file
///
/// Missing fields take their defaults.
pub fn load_settings(path: impl AsRef<Path>) -> Result<LevelSettings, SaveError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| SaveError::NotFound(path.to_path_buf()))?;
    let settings: LevelSettings = serde_json::from_reader(BufReader::new(file))?;
    settings.validate()?;
    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Write generation settings as pretty printed JSON
pub fn save_settings(settings: &LevelSettings, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, settings)?;
    Ok(())
}

/// Directory holding layout exports
pub fn export_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("delve");
    path.push("layouts");
    path
}

/// Default export path for a layout generated from `seed`
pub fn default_export_path(seed: u64) -> PathBuf {
    let mut path = export_dir();
    std::fs::create_dir_all(&path).ok();
    path.push(format!("level_{}.json", seed));
    path
}

/// Headers of every readable layout file in `dir`, newest first
pub fn list_exports(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, LayoutHeader)>, SaveError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut exports = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_export = path
            .extension()
            .is_some_and(|e| e == "json" || e == "gz");
        if is_export && let Ok(header) = load_header(&path) {
            exports.push((path, header));
        }
    }
    exports.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
    Ok(exports)
}
