use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::{Deserialize, Serialize};
use tower::Service;
use tracing::info;

use crate::config::DownloaderConfig;
use crate::downloader::IneDownloader;
use crate::error::DownloaderError;
use crate::surveys::{self, Survey};
use crate::traits::{Downloader, RunSummary};

/// One batch-download request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub download_path: PathBuf,
    pub headless: bool,
    /// Restrict the run to these years; `None` means every known survey.
    pub years: Option<Vec<u16>>,
}

impl DownloadRequest {
    pub fn new() -> Self {
        Self {
            download_path: PathBuf::from("../output"),
            headless: true,
            years: None,
        }
    }

    pub fn with_download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_years(mut self, years: impl Into<Vec<u16>>) -> Self {
        self.years = Some(years.into());
        self
    }

    /// Surveys this request covers, newest first. Unknown years are
    /// silently dropped.
    pub fn surveys(&self) -> Vec<Survey> {
        match &self.years {
            None => surveys::all().to_vec(),
            Some(years) => surveys::all()
                .iter()
                .filter(|s| years.contains(&s.year))
                .cloned()
                .collect(),
        }
    }
}

impl Default for DownloadRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&DownloadRequest> for DownloaderConfig {
    fn from(req: &DownloadRequest) -> Self {
        DownloaderConfig::new()
            .with_download_path(req.download_path.clone())
            .with_headless(req.headless)
    }
}

/// Final accounting of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub successful: usize,
    pub failed: usize,
    pub total: usize,
    pub files: Vec<PathBuf>,
}

impl From<RunSummary> for RunReport {
    fn from(summary: RunSummary) -> Self {
        Self {
            successful: summary.successful,
            failed: summary.failed,
            total: summary.total(),
            files: summary.files,
        }
    }
}

/// tower::Service wrapper over the downloader.
///
/// Per-survey failures are part of the report, not the error channel;
/// the call only errors when the browser cannot be brought up.
#[derive(Debug, Clone, Default)]
pub struct DownloadService {
    // reserved for future state (rate limits, shared browser)
}

impl DownloadService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<DownloadRequest> for DownloadService {
    type Response = RunReport;
    type Error = DownloaderError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DownloadRequest) -> Self::Future {
        info!("download request received: {:?}", req.years);

        Box::pin(async move {
            let batch = req.surveys();
            let config: DownloaderConfig = (&req).into();
            let mut downloader = IneDownloader::new(config);

            let summary = downloader.run(&batch).await?;
            let report: RunReport = summary.into();

            info!(
                "request done: {}/{} archives downloaded",
                report.successful, report.total
            );
            Ok(report)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = DownloadRequest::new()
            .with_download_path("/tmp/eh")
            .with_headless(false)
            .with_years([2018, 2017]);

        assert_eq!(req.download_path, PathBuf::from("/tmp/eh"));
        assert!(!req.headless);
        assert_eq!(req.years, Some(vec![2018, 2017]));
    }

    #[test]
    fn test_request_to_config() {
        let req = DownloadRequest::new().with_download_path("/tmp/dl");
        let config: DownloaderConfig = (&req).into();

        assert_eq!(config.download_path, PathBuf::from("/tmp/dl"));
        assert!(config.headless);
    }

    #[test]
    fn test_request_survey_selection() {
        let all = DownloadRequest::new();
        assert_eq!(all.surveys().len(), 13);

        let some = DownloadRequest::new().with_years([2018, 2005, 2010]);
        let years: Vec<u16> = some.surveys().iter().map(|s| s.year).collect();
        // 2010 does not exist and is dropped; order stays newest first
        assert_eq!(years, vec![2018, 2005]);
    }

    #[test]
    fn test_report_from_summary() {
        let summary = RunSummary {
            successful: 2,
            failed: 1,
            files: vec![PathBuf::from("eh_2018.zip"), PathBuf::from("eh_2017.zip")],
        };
        let report: RunReport = summary.into();
        assert_eq!(report.total, 3);
        assert_eq!(report.successful, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.files.len(), 2);
    }
}
