use clap::Parser;
use tradebot::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
