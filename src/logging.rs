//! Diagnostic logging for the command line.
//!
//! Library code logs through `tracing`; the binary installs a subscriber
//! writing to stderr so it never mixes with the game output on stdout.
//! `RUST_LOG` overrides the default filter.

use std::io;

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Res;

const DEFAULT_FILTER: &str = "namethatsong=warn,hyper=warn,reqwest=warn";

pub fn init_logging() -> Res<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER)?,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
