//! Embeds the build version as `STAGEHAND_VERSION`.
#![allow(clippy::print_stdout)]

use std::process::Command;

fn main() {
    // STAGEHAND_VERSION wins (release builds); otherwise describe the git checkout.
    if let Ok(version) = std::env::var("STAGEHAND_VERSION") {
        println!("cargo:rustc-env=STAGEHAND_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=STAGEHAND_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=STAGEHAND_VERSION");
}
