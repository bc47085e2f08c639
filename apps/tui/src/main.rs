use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use radar_hidrico::app::App;
use radar_hidrico::cli::CliArgs;
use radar_hidrico::config::AppConfig;
use radar_hidrico::logging::{self, LogTarget};
use radar_hidrico::report::SimulatedReportGenerator;
use radar_hidrico::{event, source, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = AppConfig::from_env()?;

    let headless = args.headless || args.json || args.generate_report || !is_terminal();
    let target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(config.log_file.clone())
    };
    logging::init(args.debug, target)?;

    let source = source::build_source(&config)?;
    let generator = Arc::new(SimulatedReportGenerator::new(config.report_delay));

    let mut filters = config.initial_filters();
    args.apply_filters(&mut filters)?;
    let mut app = App::new(config, source, generator).with_filters(filters);

    if headless {
        return event::run_headless(&mut app, args.json, args.generate_report).await;
    }

    terminal::install_panic_restore();
    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
