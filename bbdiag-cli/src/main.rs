use bbdiag_cli::{run, Cli};
use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    log::debug!("bbdiag {} starting", bbdiag_cli::VERSION);
    let summary = run(&cli)?;
    log::debug!("{} messages stored", summary.stored);
    Ok(())
}
