use eh_downloader::{DownloadRequest, DownloadService};
use tower::Service;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let year: u16 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2018);

    let mut service = DownloadService::new();
    let request = DownloadRequest::new()
        .with_download_path("./output")
        .with_headless(false) // visible browser for debugging
        .with_years([year]);

    match service.call(request).await {
        Ok(report) => {
            println!("downloaded {} file(s): {:?}", report.successful, report.files);
        }
        Err(e) => {
            eprintln!("error: {}", e);
        }
    }
}
