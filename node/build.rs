use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=GIT_COMMIT_HASH");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let from_env = ["GIT_COMMIT_HASH", "GITHUB_SHA"].iter().find_map(|key| {
        std::env::var(key)
            .ok()
            .map(|sha| sha.trim().to_string())
            .filter(|sha| !sha.is_empty())
    });

    let sha = from_env.or_else(|| {
        let output = Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .filter(|sha| !sha.is_empty())
    });

    if let Some(sha) = sha {
        println!("cargo:rustc-env=GIT_COMMIT_HASH={sha}");
    }
}
