use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output();

    // The package version is fixed in Cargo.toml; the revision only tells
    // which source tree a binary was built from.
    let revision = match output {
        Ok(o) if o.status.success() => {
            let git_output = String::from_utf8(o.stdout)
                .unwrap_or_default()
                .trim()
                .to_string();
            if git_output.is_empty() {
                "unknown".to_string()
            } else {
                git_output
            }
        }
        _ => "unknown".to_string(),
    };

    println!("cargo:rustc-env=GROUNDHOG_GIT_REVISION={}", revision);
}
