use std::{io, process::ExitCode};

use clap::Parser;
use runner::{Cli, Runner};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod batch;
mod gps_utils;
mod gpx_writer;
mod intersections;
mod map_data;
mod osm_data;
mod result_writer;
mod rules;
mod runner;
#[cfg(test)]
mod test_utils;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let builder = FmtSubscriber::builder()
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_max_level(cli.log_level);

    let set_default = if cli.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    if let Err(error) = set_default {
        eprintln!("setting default subscriber failed: {error}");
    }

    match Runner::new(cli).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "Run failed");
            ExitCode::FAILURE
        }
    }
}
