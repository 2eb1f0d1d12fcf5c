extern crate anyhow;
extern crate arcode;
extern crate clap;
extern crate serde;
extern crate serde_json;
extern crate thiserror;

#[macro_export]
macro_rules! if_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                $($body)*
            }
        }
    };
}

#[macro_export]
macro_rules! if_not_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(not(feature = "tracing"))] {
                $($body)*
            }
        }
    };
}

if_tracing! {
    use tracing_subscriber::{EnvFilter, fmt};
}

use std::process;

use crate::cli::Cli;
use clap::Parser;

mod algorithms;
mod cli;
mod compressor;
mod config;

#[cfg(test)]
mod tests;

fn main() {
    if_tracing! {
        let subscriber = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }

    let cli = Cli::parse();
    if let Err(e) = cli::execute_command(cli) {
        if_tracing! {
            tracing::error!(error = %e, "command failed");
        }
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
