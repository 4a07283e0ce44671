//! Downloader for INE Bolivia "Encuesta de Hogares" microdata archives.
//!
//! Drives a headless Chromium session against the INE database page:
//! selects a survey edition in the project dropdown, clicks the download
//! trigger, waits for the browser's download manager to finish, and
//! renames the archive to `eh_<year>.zip`.
//!
//! # Batch run via the tower service
//!
//! ```rust,ignore
//! use eh_downloader::{DownloadRequest, DownloadService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = DownloadService::new();
//!
//!     let request = DownloadRequest::new()
//!         .with_download_path("./output")
//!         .with_headless(true);
//!
//!     let report = service.call(request).await.unwrap();
//!     println!("{}/{} archives downloaded", report.successful, report.total);
//! }
//! ```
//!
//! # Direct use of the downloader
//!
//! ```rust,ignore
//! use eh_downloader::{Downloader, DownloaderConfig, IneDownloader, surveys};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DownloaderConfig::new().with_download_path("./output");
//!     let mut downloader = IneDownloader::new(config);
//!     let summary = downloader.run(surveys::all()).await.unwrap();
//!     println!("successful: {}", summary.successful);
//! }
//! ```

pub mod config;
pub mod detector;
pub mod downloader;
pub mod error;
pub mod service;
pub mod surveys;
pub mod traits;

pub use config::{DownloaderConfig, DEFAULT_BASE_URL};
pub use detector::{DirSnapshot, DownloadDetector, DownloadOutcome};
pub use downloader::IneDownloader;
pub use error::DownloaderError;
pub use service::{DownloadRequest, DownloadService, RunReport};
pub use surveys::Survey;
pub use traits::{Downloader, RunSummary};
