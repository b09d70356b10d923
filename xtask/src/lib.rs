pub mod tasks;

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

pub type DynError = Box<dyn std::error::Error>;

/// The name of the server package and binary.
pub const APP_NAME: &str = "sovereignty";

pub fn project_root() -> PathBuf {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .unwrap()
        .to_path_buf()
}

pub fn dist_dir() -> PathBuf {
    project_root().join("target/dist")
}

/// Checks that `program` can be launched, describing how to get it if not.
fn check_tool_exists(program: &str, args: &[&str], install_hint: &str) -> Result<(), DynError> {
    let status = Command::new(program)
        .current_dir(project_root())
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => Err(format!(
            "Error: '{}' is not found on the PATH. {}",
            program, install_hint
        )
        .into()),
        Err(e) => Err(format!("An unknown error occurred: {}", e).into()),
        Ok(status) if !status.success() => Err(format!(
            "Error: '{} {}' is not available. {}",
            program,
            args.join(" "),
            install_hint
        )
        .into()),
        Ok(_) => Ok(()),
    }
}

pub fn check_nextest_exists() -> Result<(), DynError> {
    check_tool_exists(
        "cargo",
        &["nextest", "--version"],
        "Install it with `cargo install cargo-nextest`.",
    )
}

pub fn check_tarpaulin_exists() -> Result<(), DynError> {
    check_tool_exists(
        "cargo",
        &["tarpaulin", "--version"],
        "Install it with `cargo install cargo-tarpaulin`.",
    )
}

pub fn check_deny_exists() -> Result<(), DynError> {
    check_tool_exists(
        "cargo",
        &["deny", "--version"],
        "Install it with `cargo install cargo-deny`.",
    )
}
