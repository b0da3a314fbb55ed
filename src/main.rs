use anyhow::Result;
use log2::*;
use std::sync::Arc;

use site_mirror::config::{self, Config};
use site_mirror::crawler;
use site_mirror::START_TIME;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = *START_TIME;
    let cfg = Config::new();
    cfg.validate()?;
    let _log2 = stdout()
        .module(true) // include module name
        .module_with_line(true) // include line number from module
        .module_filter(|module| module.starts_with("site_mirror")) // only this crate
        .compress(false)
        .level(cfg.log_level.to_string())
        .start();

    // bad seed or unusable output directory: nothing has started yet
    let crawler_config = cfg.to_crawler_config()?;
    config::prepare_output_dir(&crawler_config)?;

    let crawler_config = Arc::new(crawler_config);
    let state = Arc::new(crawler::CrawlerState::new());

    match crawler::crawl(state, crawler_config.clone()).await {
        Ok(summary) => {
            for failure in &summary.failures {
                eprintln!("failed: {} ({})", failure.url, failure.message);
            }
            info!("Mirror written to {}", crawler_config.output_dir.display());
            println!("{}", summary);
        }
        Err(e) => {
            error!("Crawling failed: {}", e);
            return Err(e);
        }
    }

    debug!("Total runtime {:.2?}", START_TIME.elapsed());
    Ok(())
}
