use std::path::PathBuf;

/// Runtime settings read from the environment (and `.env`).
///
/// Everything describing *what* to watch lives in the catalog file at
/// `catalog_path`; this struct only carries deployment knobs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub output_path: PathBuf,
    pub log_level: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
}
