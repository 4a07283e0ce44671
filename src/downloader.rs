//! Browser automation against the INE download page.
//!
//! One page, one survey at a time: select the survey in the `#proyecto`
//! dropdown, click `#btn_ajax`, then hand off to the detector to watch
//! the download directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::config::DownloaderConfig;
use crate::detector::{rename_to_canonical, DirSnapshot, DownloadDetector, DownloadOutcome};
use crate::error::DownloaderError;
use crate::surveys::Survey;
use crate::traits::Downloader;

const DROPDOWN_SELECTOR: &str = "#proyecto";
const DOWNLOAD_BUTTON_SELECTOR: &str = "#btn_ajax";
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct IneDownloader {
    config: DownloaderConfig,
    browser: Option<Browser>,
    page: Option<Arc<Page>>,
}

impl IneDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self {
            config,
            browser: None,
            page: None,
        }
    }

    fn get_page(&self) -> Result<&Arc<Page>, DownloaderError> {
        self.page
            .as_ref()
            .ok_or_else(|| DownloaderError::BrowserInit("browser not initialized".into()))
    }

    /// Poll until the selector resolves or the element budget runs out.
    async fn wait_for_element(
        &self,
        page: &Page,
        selector: &str,
    ) -> Result<Element, DownloaderError> {
        let start = Instant::now();
        loop {
            if let Ok(element) = page.find_element(selector).await {
                return Ok(element);
            }
            if start.elapsed() >= self.config.element_timeout {
                return Err(DownloaderError::ElementNotFound(selector.to_string()));
            }
            tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
        }
    }

    /// Poll until the download button exists and is enabled.
    async fn wait_until_clickable(&self, page: &Page) -> Result<Element, DownloaderError> {
        let start = Instant::now();
        loop {
            let enabled: bool = page
                .evaluate(
                    r#"
                    (function() {
                        var btn = document.getElementById('btn_ajax');
                        return !!btn && !btn.disabled;
                    })()
                    "#,
                )
                .await
                .map(|v| v.into_value().unwrap_or(false))
                .unwrap_or(false);

            if enabled {
                return page
                    .find_element(DOWNLOAD_BUTTON_SELECTOR)
                    .await
                    .map_err(|e| {
                        DownloaderError::ElementNotFound(format!("download button: {}", e))
                    });
            }
            if start.elapsed() >= self.config.element_timeout {
                return Err(DownloaderError::ElementNotFound(format!(
                    "download button ({}) not clickable",
                    DOWNLOAD_BUTTON_SELECTOR
                )));
            }
            tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
        }
    }

    /// Dump the dropdown's options, for diagnosing value drift after INE
    /// page updates.
    async fn log_dropdown_options(&self, page: &Page) {
        let options: serde_json::Value = page
            .evaluate(
                r#"
                (function() {
                    var select = document.getElementById('proyecto');
                    if (!select) return null;
                    var out = [];
                    for (var i = 0; i < select.options.length; i++) {
                        out.push({
                            value: select.options[i].value,
                            label: select.options[i].textContent.trim()
                        });
                    }
                    return out;
                })()
                "#,
            )
            .await
            .map(|v| v.into_value().unwrap_or(serde_json::Value::Null))
            .unwrap_or(serde_json::Value::Null);
        debug!("dropdown options: {}", options);
    }

    /// Set the project dropdown to the survey's value and fire `change`,
    /// the way the page's own script expects.
    async fn select_survey(&self, page: &Page, survey: &Survey) -> Result<(), DownloaderError> {
        let js = format!(
            r#"
            (function() {{
                var select = document.getElementById('proyecto');
                if (!select) return false;
                select.value = '{value}';
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return select.value === '{value}';
            }})()
            "#,
            value = survey.dropdown_value
        );

        let selected: bool = page
            .evaluate(js)
            .await
            .map(|v| v.into_value().unwrap_or(false))
            .unwrap_or(false);

        if !selected {
            return Err(DownloaderError::ElementNotFound(format!(
                "dropdown option '{}' for {}",
                survey.dropdown_value, survey.name
            )));
        }
        debug!("selected survey: {}", survey.name);
        Ok(())
    }

    async fn try_download(
        &self,
        page: &Page,
        survey: &Survey,
    ) -> Result<PathBuf, DownloaderError> {
        page.goto(&self.config.base_url)
            .await
            .map_err(|e| DownloaderError::Navigation(e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| DownloaderError::Navigation(e.to_string()))?;
        debug!("navigated to {}", self.config.base_url);

        self.wait_for_element(page, DROPDOWN_SELECTOR).await?;
        if self.config.debug {
            self.log_dropdown_options(page).await;
        }
        self.select_survey(page, survey).await?;

        let button = self.wait_until_clickable(page).await?;

        let before = DirSnapshot::capture(&self.config.download_path)?;
        button
            .click()
            .await
            .map_err(|e| DownloaderError::Download(format!("download click: {}", e)))?;
        info!("clicked download, waiting for the file...");

        // give the download manager a moment to create the entry
        tokio::time::sleep(self.config.click_grace).await;

        let detector = DownloadDetector::new(
            &self.config.download_path,
            self.config.download_timeout,
            self.config.poll_interval,
        );

        match detector.wait(&before).await? {
            DownloadOutcome::Completed(path) => rename_to_canonical(&path, survey.year),
            DownloadOutcome::NoNewFile => Err(DownloaderError::NoNewFile(
                self.config.download_path.display().to_string(),
            )),
            DownloadOutcome::TimedOut => Err(DownloaderError::Timeout(format!(
                "download of {} exceeded {}s",
                survey.name,
                self.config.download_timeout.as_secs()
            ))),
        }
    }

    async fn save_debug_screenshot(&self, page: &Page, survey: &Survey) {
        let path = self
            .config
            .download_path
            .join(format!("debug_{}.png", survey.year));
        let params = ScreenshotParams::builder().full_page(true).build();
        match page.save_screenshot(params, &path).await {
            Ok(_) => debug!("debug screenshot saved: {:?}", path),
            Err(e) => debug!("debug screenshot failed: {}", e),
        }
    }
}

#[async_trait]
impl Downloader for IneDownloader {
    async fn initialize(&mut self) -> Result<(), DownloaderError> {
        info!("initializing browser...");

        std::fs::create_dir_all(&self.config.download_path)?;
        let download_path = self
            .config
            .download_path
            .canonicalize()
            .unwrap_or_else(|_| self.config.download_path.clone());

        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .no_sandbox()
            .arg("--disable-gpu");

        if self.config.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| DownloaderError::BrowserInit(format!("browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| DownloaderError::BrowserInit(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DownloaderError::BrowserInit(e.to_string()))?;

        // route downloads into our directory
        let download_params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(download_path.to_string_lossy().to_string())
            .events_enabled(true)
            .build()
            .map_err(|e| DownloaderError::BrowserInit(format!("download behavior: {}", e)))?;

        page.execute(download_params)
            .await
            .map_err(|e| DownloaderError::BrowserInit(format!("download behavior: {}", e)))?;

        self.browser = Some(browser);
        self.page = Some(Arc::new(page));

        info!("browser ready, downloads go to {:?}", download_path);
        Ok(())
    }

    async fn download_survey(&mut self, survey: &Survey) -> Result<PathBuf, DownloaderError> {
        let page = self.get_page()?.clone();

        let result = self.try_download(&page, survey).await;
        if result.is_err() && self.config.debug {
            self.save_debug_screenshot(&page, survey).await;
        }
        if let Err(e) = &result {
            warn!("survey {} failed: {}", survey.year, e);
        }
        result
    }

    async fn close(&mut self) -> Result<(), DownloaderError> {
        info!("closing browser...");
        self.page = None;
        self.browser = None;
        Ok(())
    }

    fn cool_down(&self) -> Duration {
        self.config.pause_between_surveys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ine_downloader_new() {
        let downloader = IneDownloader::new(DownloaderConfig::default());
        assert!(downloader.browser.is_none());
        assert!(downloader.page.is_none());
    }

    #[test]
    fn test_cool_down_comes_from_config() {
        let config = DownloaderConfig::default();
        let pause = config.pause_between_surveys;
        let downloader = IneDownloader::new(config);
        assert_eq!(downloader.cool_down(), pause);
    }
}
