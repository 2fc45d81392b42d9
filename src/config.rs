// src/config.rs

use std::path::PathBuf;

/// Medicines metadata export published by the CBG-MEB.
pub static DEFAULT_URL: &str = "https://www.geneesmiddeleninformatiebank.nl/metadata.csv";

/// Where the app bundle picks the dataset up, relative to `data/`.
pub static DEFAULT_OUTPUT: &str = "../assets/data.json";

pub const DEFAULT_DELIMITER: u8 = b'|';

/// Columns the app never reads; dropped from every record before writing.
pub static REMOVED_COLUMNS: &[&str] = &[
    "POTENTIE",
    "PROCEDURENUMMER",
    "AANVULLENDEMONITORING",
    "PAR_FILENAAM",
    "SPAR_FILENAAM",
    "ARM_FILENAAM",
    "ARMM_FILENAAM",
    "NIEUWS_LINKS",
    "NIEUWS_LINKS_DATUM",
    "NIEUWS_LINK_DATUMS",
];

/// Everything one run needs, passed explicitly into [`crate::run::run`].
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub output: PathBuf,
    pub delimiter: u8,
    pub removal: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: DEFAULT_URL.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            delimiter: DEFAULT_DELIMITER,
            removal: REMOVED_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}
