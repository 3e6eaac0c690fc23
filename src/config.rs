use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::models::{DEFAULT_COLUMN_NAMES, SCHEMA_WIDTH};

/// Keywords that mark a table row as header/footer noise.
pub const DEFAULT_NOISE_KEYWORDS: &[&str] = &[
    "nome",
    "data",
    "entr",
    "said",
    "saíd",
    "tarde",
    "manha",
    "manhã",
    "instituição",
    "instituicao",
    "página",
    "pagina",
    "emissão",
    "emissao",
    "estado de mato grosso",
    "relação de registro",
    "relacao de registro",
];

/// Characters of text inspected before each date by the fallback extractor.
pub const DEFAULT_LOOKBACK_CHARS: usize = 400;

/// Configuration for the extraction service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExtractorConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub column_names: [String; SCHEMA_WIDTH],
    pub noise_keywords: Vec<String>,
    pub lookback_chars: usize,
    /// When false the table capability reports itself unavailable.
    pub enable_tables: bool,
    pub layout: LayoutConfig,
}

/// Tolerances used when rebuilding tables from positioned page text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Max baseline difference, in points, for fragments to share a line.
    pub row_tolerance: f32,
    /// Max x difference, in points, for fragments to share a column.
    pub column_tolerance: f32,
    pub min_table_columns: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            input: PathBuf::from("entrada.pdf"),
            output: PathBuf::from("saida.xlsx"),
            column_names: DEFAULT_COLUMN_NAMES.map(String::from),
            noise_keywords: DEFAULT_NOISE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            lookback_chars: DEFAULT_LOOKBACK_CHARS,
            enable_tables: true,
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            row_tolerance: 2.0,
            column_tolerance: 5.0,
            min_table_columns: 2,
        }
    }
}

impl ExtractorConfig {
    /// Loads a JSON config file; missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
