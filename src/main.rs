use football_tables::fetch::HttpFetcher;
use football_tables::sink::PgSink;
use football_tables::{pipeline, sources, Config};
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Before the logger, so RUST_LOG can live in .env too
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let fetcher = HttpFetcher::new()?;
    let mut sink = PgSink::connect_lazy(&config.database_url)?;

    let report = pipeline::run(&fetcher, &mut sink, &sources::all()).await;
    info!("{}", report);
    info!("All uploads completed.");
    Ok(())
}
