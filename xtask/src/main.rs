use std::env;

use xtask::{
    tasks::{ci::ci, coverage::coverage, distribute::dist, test::xtest},
    DynError,
};

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{}", e);
        std::process::exit(-1);
    }
}

fn try_main() -> Result<(), DynError> {
    let task = env::args().nth(1);
    match task.as_deref() {
        Some("ci") => ci()?,
        Some("test") => xtest()?,
        Some("coverage") => coverage()?,
        Some("dist") => dist()?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        "
Usage: cargo xtask <task>

Tasks:
  ci              runs all necessary checks to avoid CI errors when git pushed
  test            runs the test suite, with cargo-nextest when it is installed
  coverage        runs test coverage analysis with cargo-tarpaulin
  dist            builds the release binary, its configuration and man page"
    )
}
