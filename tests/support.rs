use std::ffi::OsStr;
use std::process::{Command, Output};

#[path = "../src/test_support.rs"]
mod server;

pub(crate) use server::{Reply, closed_port_url, spawn_http_server};

/// Run the `hit` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_hit<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_hit_in(args, None)
}

/// Like [`run_hit`], from `dir` as the working directory.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_hit_in<I, S>(args: I, dir: Option<&std::path::Path>) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = hit_bin()?;
    let mut command = Command::new(bin);
    command
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("HIT_LOG")
        .env("NO_COLOR", "1");
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    command
        .output()
        .map_err(|err| format!("run hit failed: {}", err))
}

fn hit_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_hit").map_or_else(
        || Err("CARGO_BIN_EXE_hit missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

#[must_use]
pub fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
