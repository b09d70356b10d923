use std::{
    env, fs,
    process::{Command, Stdio},
};

use man::prelude::*;

use crate::{dist_dir, project_root, APP_NAME};

pub fn dist() -> Result<(), anyhow::Error> {
    let _ = fs::remove_dir_all(dist_dir());
    fs::create_dir_all(dist_dir())?;

    dist_binary()?;
    dist_manpage()?;

    Ok(())
}

pub fn dist_binary() -> Result<(), anyhow::Error> {
    // Get the `cargo` command and then build the release
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let status = Command::new(cargo)
        .current_dir(project_root())
        .args(["build", "--release", "-p", APP_NAME])
        .status()?;

    if !status.success() {
        anyhow::bail!("cargo build failed");
    }

    // Set file paths based on the architecture
    #[allow(unused_mut)]
    let mut distributable = project_root().join("target/release").join(APP_NAME);

    #[allow(unused_mut)]
    let mut destination = dist_dir().join(APP_NAME);

    #[cfg(windows)]
    distributable.set_extension("exe");
    #[cfg(windows)]
    destination.set_extension("exe");

    // Copy the binary
    fs::copy(&distributable, &destination)?;

    // Copy config files; local settings carry a development key and stay behind
    let config_src = project_root().join(APP_NAME).join("configuration");
    let config_dest = dist_dir().join("configuration");
    fs::create_dir(&config_dest)?;

    for f in fs::read_dir(config_src)? {
        let f = f?;
        if f.file_name().eq("local.yml") {
            continue;
        }
        fs::copy(f.path(), config_dest.join(f.file_name()))?;
    }

    // Strip the copied binary
    if Command::new("strip")
        .arg("--version")
        .stdout(Stdio::null())
        .status()
        .is_ok()
    {
        eprintln!("stripping the binary");
        let status = Command::new("strip").arg(&destination).status()?;
        if !status.success() {
            anyhow::bail!("strip failed");
        }
    } else {
        eprintln!("No `strip` utility found");
    }

    Ok(())
}

pub fn dist_manpage() -> Result<(), anyhow::Error> {
    let page = Manual::new(APP_NAME)
        .about("Serves the Sovereignty Equestrian site and relays contact inquiries by email.")
        .env(
            Env::new("APP_ENVIRONMENT")
                .default_value("local")
                .help("Selects configuration/local.yml or configuration/production.yml."),
        )
        .env(Env::new("RESEND_API_KEY").help("Credential for the Resend email API. Required."))
        .env(
            Env::new("CONTACT_FROM")
                .default_value("Sovereignty Equestrian <onboarding@resend.dev>")
                .help("Sender identity of relayed inquiries."),
        )
        .env(
            Env::new("CONTACT_TO")
                .default_value("sovereigntyequestrian@gmail.com")
                .help("Inbox that receives relayed inquiries."),
        )
        .env(Env::new("RUST_LOG").help("Overrides the log filter, e.g. `sovereignty=debug`."))
        .render();
    fs::write(dist_dir().join(format!("{}.man", APP_NAME)), page)?;
    Ok(())
}
