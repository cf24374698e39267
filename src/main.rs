mod config;
mod document;
mod error;
mod logging;
mod source;
mod store;
mod updater;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, value_parser};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

use crate::config::Config;
use crate::source::HttpSource;
use crate::store::Store;
use crate::updater::Updater;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = config_from(&matches);

    logging::init(&config.log_path)?;

    // One cycle per invocation; scheduling is cron's job
    let source = HttpSource::new(&config)?;
    let updater = Updater::new(Store::new(config.store_path.clone()), source);

    if let Err(e) = updater.update().await {
        error!("Update failed: {e:#}");
        return Err(e).context("Update cycle aborted");
    }

    Ok(())
}

fn cli() -> Command {
    Command::new("audience-updater")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetches Skyrock audience figures and merges them into the local JSON store")
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("PATH")
                .help("JSON document to update")
                .default_value(config::DEFAULT_STORE_PATH)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("File the log is appended to (in addition to stdout)")
                .default_value(config::DEFAULT_LOG_PATH)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .help("Primary source page")
                .default_value(config::PRIMARY_SOURCE_URL),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Request timeout for the primary source")
                .default_value("10")
                .value_parser(value_parser!(u64)),
        )
}

fn config_from(matches: &ArgMatches) -> Config {
    let mut config = Config::default();
    if let Some(path) = matches.get_one::<PathBuf>("store") {
        config.store_path = path.clone();
    }
    if let Some(path) = matches.get_one::<PathBuf>("log-file") {
        config.log_path = path.clone();
    }
    if let Some(url) = matches.get_one::<String>("url") {
        config.source_url = url.clone();
    }
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        config.timeout = Duration::from_secs(*secs);
    }
    config
}
