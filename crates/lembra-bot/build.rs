use std::process::Command;

const SHA_ENV: &str = "LEMBRA_GIT_SHA";

/// Commit reported by `lembra --version` and the startup log line.
///
/// Packagers building from a source tarball (no `.git`) can pass the value
/// through the environment instead.
fn commit_sha() -> String {
    if let Ok(sha) = std::env::var(SHA_ENV) {
        if !sha.trim().is_empty() {
            return sha.trim().to_string();
        }
    }
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|sha| !sha.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rustc-env={SHA_ENV}={}", commit_sha());
    println!("cargo:rerun-if-env-changed={SHA_ENV}");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
