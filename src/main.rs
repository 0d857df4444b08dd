use adsb_probe::cli;
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    match cli::dispatch(args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            // dispatch logs its own errors once a subscriber is up
            if !tracing::dispatcher::has_been_set() {
                eprintln!("error: {:#}", err);
            }
            std::process::exit(1);
        }
    }
}
