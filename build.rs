//! Build script: embeds the version string as `LINKTHEDOTS_VERSION`.

use std::process::Command;

fn main() {
    // LINKTHEDOTS_VERSION wins (release builds); local builds describe the checkout.
    if let Ok(version) = std::env::var("LINKTHEDOTS_VERSION") {
        println!("cargo:rustc-env=LINKTHEDOTS_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !version.is_empty() {
            println!("cargo:rustc-env=LINKTHEDOTS_VERSION={version}");
        }
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=LINKTHEDOTS_VERSION");
}
