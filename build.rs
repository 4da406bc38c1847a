use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let hash = command_output("git", &["rev-parse", "--short", "HEAD"]);
    emit("SPENDWISE_BUILD_HASH", hash.as_deref().unwrap_or("unknown"));

    let status = command_output("git", &["status", "--porcelain"])
        .map(|out| if out.is_empty() { "clean" } else { "dirty" });
    emit("SPENDWISE_BUILD_STATUS", status.unwrap_or("unknown"));

    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    emit("SPENDWISE_BUILD_TIMESTAMP", &timestamp);

    for (key, var) in [
        ("SPENDWISE_BUILD_TARGET", "TARGET"),
        ("SPENDWISE_BUILD_PROFILE", "PROFILE"),
    ] {
        let value = env::var(var).unwrap_or_else(|_| "unknown".to_string());
        emit(key, &value);
    }

    let rustc = command_output("rustc", &["--version"]);
    emit("SPENDWISE_BUILD_RUSTC", rustc.as_deref().unwrap_or("unknown"));
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

/// Runs a command and returns its trimmed stdout when it succeeds.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
