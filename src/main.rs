use anyhow::Result;
use clap::Parser;
use slim::analyze::{AnalyzeOptions, analyze};
use slim::cli;
use slim::config::Config;
use tracing::Level;

fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_logging(args.debug);

    let mut config = Config::get().clone();
    if args.include_staged {
        config.include_staged = true;
    }

    let options = AnalyzeOptions::new(args.repo, args.diff, config).with_patterns(args.patterns);
    let report = analyze(&options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_lines());
    }
    Ok(())
}
