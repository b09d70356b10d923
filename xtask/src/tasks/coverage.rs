use std::process::{Command, ExitStatus};

use crate::{check_tarpaulin_exists, project_root, APP_NAME};

pub fn coverage() -> Result<(), anyhow::Error> {
    println!("Running test coverage analysis...");
    let status = run_coverage_test()?;
    if !status.success() {
        anyhow::bail!("coverage analysis finished with {}", status);
    }
    Ok(())
}

pub fn run_coverage_test() -> Result<ExitStatus, anyhow::Error> {
    if check_tarpaulin_exists().is_err() {
        anyhow::bail!("Unable to run test coverage analysis. cargo-tarpaulin is not available.");
    }
    let test = Command::new("cargo")
        .current_dir(project_root())
        .args(["tarpaulin", "-p", APP_NAME, "--skip-clean"])
        .status()?;
    Ok(test)
}
