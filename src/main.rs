use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use pollmux::application::App;
use pollmux::domain::{DataSource, Endpoint, PollFrequency};
use pollmux::infrastructure::{
    HttpDataSource, TokioTimer, TomlConfigRepository, TomlStatusRepository,
};
use tokio::io::AsyncBufReadExt;

#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    #[clap(
        short,
        long,
        help = "Specify the config file.",
        default_value = "./pollmux.toml"
    )]
    config_path: String,
    #[clap(
        short,
        long,
        help = "Specify the status file.",
        default_value = "./status.toml"
    )]
    status_path: String,
    #[clap(
        short('i'),
        long,
        help = "Poll frequency in milliseconds for pollers that do not set one.",
        default_value_t = 60_000
    )]
    interval_millis: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("pollmux=info")).init();

    info!("config_path:     {}", args.config_path);
    info!("status_path:     {}", args.status_path);
    info!("interval_millis: {}", args.interval_millis);

    let default_frequency = PollFrequency::from_millis(args.interval_millis)?;
    let config_repo = TomlConfigRepository::new(&args.config_path).await?;
    let status_repo = TomlStatusRepository::new(&args.status_path).await?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("pollmux/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let connect = move |endpoint: Endpoint| -> Arc<dyn DataSource> {
        Arc::new(HttpDataSource::new(client.clone()).with_endpoint(endpoint))
    };

    info!("start app.");
    let app = App::new(
        config_repo,
        status_repo,
        connect,
        Arc::new(TokioTimer::new()),
        default_frequency,
    );

    let shutdown = async {
        tokio::select! {
            _ = quit_on_stdin() => (),
            _ = tokio::signal::ctrl_c() => (),
        }
    };

    if let Err(why) = app.run(shutdown).await {
        error!("{why}");
    }

    Ok(())
}

/// Resolves once `q` is entered.
async fn quit_on_stdin() {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim() == "q" => break,
            Ok(Some(_)) => (),
            Ok(None) | Err(_) => {
                // Without a terminal (e.g. under a service manager) keep running until Ctrl-C.
                std::future::pending::<()>().await;
            }
        }
    }
}
