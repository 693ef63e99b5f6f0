mod cli;
mod input;
mod live;
mod logging;
mod replay;
mod tracker;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
