use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloaderError {
    #[error("browser init error: {0}")]
    BrowserInit(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("download error: {0}")]
    Download(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("no new file detected in {0}")]
    NoNewFile(String),

    #[error("file operation error: {0}")]
    FileIO(#[from] std::io::Error),
}
