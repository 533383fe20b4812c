//! Reads period strings from the command line and prints them normalized.
//!
//! ```text
//! fiscalis [--config PATH] PERIOD...
//! ```
//!
//! Each line shows the period, its first day, its last day and its sort key.

use std::env;
use std::process::ExitCode;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fiscalis::entity::Personifiable;
use fiscalis::period::{Period, parse_period, sort_key};
use fiscalis::settings::Settings;
use fiscalis::unit::Unit;

fn main() -> ExitCode {
    let mut config = None;
    let mut periods = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(path) => config = Some(path),
                None => {
                    eprintln!("--config requires a path");
                    return ExitCode::FAILURE;
                }
            },
            _ => periods.push(arg),
        }
    }

    let settings = match Settings::load(config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match settings.build_entities() {
        Ok(entities) => {
            for entity in &entities {
                info!(entity = %entity, plural = entity.plural(), "entity configured");
            }
        }
        Err(e) => warn!(error = %e, "entities could not be built"),
    }

    let mut failed = false;
    for text in &periods {
        match parse_period(text).and_then(describe) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                failed = true;
                eprintln!("{}", e);
            }
        }
    }
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn describe(period: Period) -> fiscalis::Result<String> {
    let stop = match period.unit() {
        Unit::Eternity => String::from("inf"),
        _ => period.stop()?.to_string(),
    };
    Ok(format!("{}\t{}\t{}\t{}", period, period.start(), stop, sort_key(&period)))
}
