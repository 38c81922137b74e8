mod app;
mod args;
mod controller;
mod input;
mod logging;
mod profile;

use clap::Parser;

pub use app::App;

fn main() -> anyhow::Result<()> {
    let cli = args::Cli::parse();
    logging::init_logging(cli.log_format, cli.verbose);

    let app = App::new(&cli)?;
    app.run()?;

    Ok(())
}
