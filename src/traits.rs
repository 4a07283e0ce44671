use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use crate::error::DownloaderError;
use crate::surveys::Survey;

/// Per-run accounting. One increment per survey attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub successful: usize,
    pub failed: usize,
    pub files: Vec<PathBuf>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }
}

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Launch the browser and prepare the download directory.
    async fn initialize(&mut self) -> Result<(), DownloaderError>;

    /// Download one survey archive, returning its final path.
    async fn download_survey(&mut self, survey: &Survey) -> Result<PathBuf, DownloaderError>;

    /// Release browser resources.
    async fn close(&mut self) -> Result<(), DownloaderError>;

    /// Pause inserted after each survey attempt.
    fn cool_down(&self) -> Duration {
        Duration::ZERO
    }

    /// Run a batch in order (initialize → each survey → close).
    ///
    /// Per-survey errors are logged and counted, never propagated; only an
    /// initialization failure aborts the run.
    async fn run(&mut self, surveys: &[Survey]) -> Result<RunSummary, DownloaderError> {
        self.initialize().await?;

        let mut summary = RunSummary::default();
        for survey in surveys {
            info!("downloading: {}", survey.name);
            match self.download_survey(survey).await {
                Ok(path) => {
                    info!("downloaded {} -> {:?}", survey.name, path);
                    summary.successful += 1;
                    summary.files.push(path);
                }
                Err(e) => {
                    error!("failed to download {} ({}): {}", survey.name, survey.year, e);
                    summary.failed += 1;
                }
            }
            tokio::time::sleep(self.cool_down()).await;
        }

        self.close().await?;

        info!(
            "run finished: {} successful, {} failed, {} total",
            summary.successful,
            summary.failed,
            summary.total()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surveys;

    /// Downloader that succeeds for even years and fails for odd ones.
    struct StubDownloader {
        init_fails: bool,
    }

    #[async_trait]
    impl Downloader for StubDownloader {
        async fn initialize(&mut self) -> Result<(), DownloaderError> {
            if self.init_fails {
                Err(DownloaderError::BrowserInit("stub".into()))
            } else {
                Ok(())
            }
        }

        async fn download_survey(&mut self, survey: &Survey) -> Result<PathBuf, DownloaderError> {
            if survey.year % 2 == 0 {
                Ok(PathBuf::from(survey.canonical_name()))
            } else {
                Err(DownloaderError::NoNewFile("stub".into()))
            }
        }

        async fn close(&mut self) -> Result<(), DownloaderError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_counts_per_survey_results() {
        let mut stub = StubDownloader { init_fails: false };
        let batch: Vec<Survey> = surveys::all()[..4].to_vec();

        // 2018, 2016 succeed; 2017, 2015 fail
        let summary = stub.run(&batch).await.unwrap();
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total(), 4);
        assert_eq!(
            summary.files,
            vec![PathBuf::from("eh_2018.zip"), PathBuf::from("eh_2016.zip")]
        );
    }

    #[tokio::test]
    async fn test_init_failure_aborts_run() {
        let mut stub = StubDownloader { init_fails: true };
        let result = stub.run(surveys::all()).await;
        assert!(matches!(result, Err(DownloaderError::BrowserInit(_))));
    }
}
