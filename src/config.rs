use std::path::PathBuf;
use std::time::Duration;

/// INE database page the surveys are downloaded from.
pub const DEFAULT_BASE_URL: &str =
    "https://www.ine.gob.bo/index.php/censos-y-banco-de-datos/censos/bases-de-datos-encuestas-sociales/";

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub base_url: String,
    pub download_path: PathBuf,
    pub headless: bool,
    pub debug: bool,
    /// Budget for the whole download of one archive.
    pub download_timeout: Duration,
    /// Interval between directory listings while waiting.
    pub poll_interval: Duration,
    /// Budget for locating page elements.
    pub element_timeout: Duration,
    /// Grace delay after the click, before polling starts.
    pub click_grace: Duration,
    /// Pause between consecutive surveys.
    pub pause_between_surveys: Duration,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            download_path: PathBuf::from("../output"),
            headless: true,
            debug: false,
            download_timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(1),
            element_timeout: Duration::from_secs(60),
            click_grace: Duration::from_secs(3),
            pause_between_surveys: Duration::from_secs(2),
        }
    }
}

impl DownloaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloaderConfig::default();
        assert!(config.headless);
        assert_eq!(config.download_timeout, Duration::from_secs(600));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.download_path, PathBuf::from("../output"));
    }

    #[test]
    fn test_config_builder() {
        let config = DownloaderConfig::new()
            .with_headless(false)
            .with_download_path("/tmp/eh")
            .with_download_timeout(Duration::from_secs(120))
            .with_poll_interval(Duration::from_millis(200));

        assert!(!config.headless);
        assert_eq!(config.download_path, PathBuf::from("/tmp/eh"));
        assert_eq!(config.download_timeout, Duration::from_secs(120));
        assert_eq!(config.poll_interval, Duration::from_millis(200));
    }
}
