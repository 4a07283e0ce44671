use eh_downloader::{Downloader, DownloaderConfig, IneDownloader, surveys};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = DownloaderConfig::new().with_download_path("./output");

    println!("Download directory: {:?}", config.download_path);
    println!("Surveys to download: {}", surveys::all().len());

    let mut downloader = IneDownloader::new(config);

    match downloader.run(surveys::all()).await {
        Ok(summary) => {
            println!("\n=== DOWNLOAD SUMMARY ===");
            println!("Successful: {}", summary.successful);
            println!("Failed: {}", summary.failed);
            println!("Total: {}", summary.total());
        }
        Err(e) => {
            eprintln!("run aborted: {}", e);
        }
    }
}
