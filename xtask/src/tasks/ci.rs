use std::process::{Command, ExitStatus};

use owo_colors::OwoColorize;

use crate::{check_deny_exists, project_root, tasks::test::run_test, APP_NAME};

pub fn ci() -> Result<(), anyhow::Error> {
    println!("Running `cargo check`...");
    let check = cargo(&["check", "--workspace", "--all-targets"])?;

    println!("Running `cargo clippy`...");
    let clippy = cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;

    println!("Running `cargo build`...");
    let build = cargo(&["build", "-p", APP_NAME])?;

    println!("Running tests...");
    let test = run_test().map_err(|e| anyhow::anyhow!("failed to run tests: {}", e))?;

    let audit = if check_deny_exists().is_ok() {
        println!("Running `cargo deny`...");
        Some(cargo(&["deny", "check"])?)
    } else {
        println!("{} cargo-deny is not installed, skipping", "Warning:".yellow());
        None
    };

    println!("Running `cargo fmt --check`...");
    let fmt = cargo(&["fmt", "--all", "--check"])?;

    let mut failures = 0;
    failures += print_error_with_status_code("cargo check", check);
    failures += print_error_with_status_code("cargo clippy", clippy);
    failures += print_error_with_status_code("cargo build", build);
    failures += print_error_with_status_code("tests", test);
    if let Some(audit) = audit {
        failures += print_error_with_status_code("cargo deny", audit);
    }
    failures += print_error_with_status_code("cargo fmt", fmt);

    if failures > 0 {
        anyhow::bail!("{} CI check(s) failed", failures);
    }

    println!(
        "CI checks complete. Consider running `cargo xtask coverage`.\
    Coverage checks are not completed by the CI checks due to the time requirement."
    );
    Ok(())
}

fn cargo(args: &[&str]) -> Result<ExitStatus, anyhow::Error> {
    let status = Command::new("cargo")
        .current_dir(project_root())
        .args(args)
        .status()?;
    Ok(status)
}

/// Reports a failed task. Returns 1 when the task failed, 0 otherwise.
fn print_error_with_status_code(task: &str, status: ExitStatus) -> usize {
    if status.success() {
        return 0;
    }
    let code = match status.code() {
        Some(x) => x.to_string(),
        None => "<< no status code >>".to_string(),
    };
    println!(
        "{} `{}` finished with a non-zero status code: {}",
        "Error:".to_string().red(),
        task.blue(),
        code
    );
    1
}
