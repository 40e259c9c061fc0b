use clap::Parser;
use color_eyre::Result;

use crisis_docs::app::App;
use crisis_docs::cli::CliArgs;
use crisis_docs::config::AppConfig;
use crisis_docs::{event, logging, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = AppConfig::from_env();
    let _log_guard = logging::init_logging(&config.log_file, config.debug || args.debug)?;
    tracing::info!(source = %config.data_source, "starting crisis-docs");

    let mut app = App::new();
    app.initialize(&config).await?;

    // Check if we're running in a terminal
    if args.headless || !is_terminal() {
        return event::run_headless(&mut app, &args).await;
    }

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup(true, true);

    result
}

fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
