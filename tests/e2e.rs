mod support;

use std::fs;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use hit::{CancelToken, ClientTuning, Options, RequestTemplate, send_n, summarize};
use reqwest::Method;
use tempfile::tempdir;

use support::{Reply, closed_port_url, describe, run_hit, run_hit_in, spawn_http_server};

#[test]
fn e2e_cli_sends_exactly_n_requests() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK"))?;
    let url = server.url().to_owned();

    let output = run_hit(["-n", "10", "-c", "2", url.as_str()])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if server.hits() != 10 {
        return Err(format!("Expected 10 hits, got {}", server.hits()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let plan = format!("Sending 10 requests to \"{}\" (concurrency: 2)", url);
    for needle in [plan.as_str(), "Summary:", "Success  : 100%", "Requests : 10"] {
        if !stdout.contains(needle) {
            return Err(format!("Missing '{}'\n{}", needle, describe(&output)));
        }
    }
    Ok(())
}

#[test]
fn e2e_cli_json_summary() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK"))?;

    let output = run_hit(["-n", "6", "-c", "3", "--output-format", "json", server.url()])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if server.hits() != 6 {
        return Err(format!("Expected 6 hits, got {}", server.hits()));
    }
    let value = json_summary(&output)?;
    if value.get("total_requests").and_then(serde_json::Value::as_u64) != Some(6) {
        return Err(format!("Unexpected summary: {}", value));
    }
    if value.get("total_bytes").and_then(serde_json::Value::as_u64) != Some(12) {
        return Err(format!("Unexpected byte count: {}", value));
    }
    Ok(())
}

fn json_summary(output: &std::process::Output) -> Result<serde_json::Value, String> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or("No output")?;
    serde_json::from_str(last).map_err(|err| format!("invalid json '{}': {}", last, err))
}

#[test]
fn e2e_cli_counts_error_statuses_as_failures() -> Result<(), String> {
    let server = spawn_http_server(Reply::status(503, "Service Unavailable"))?;

    let output = run_hit(["-n", "4", "--output-format", "json", server.url()])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let value = json_summary(&output)?;
    if value.get("total_requests").and_then(serde_json::Value::as_u64) != Some(4) {
        return Err(format!("Unexpected summary: {}", value));
    }
    if value.get("error_count").and_then(serde_json::Value::as_u64) != Some(0) {
        return Err(format!("Status codes are not request errors: {}", value));
    }
    if value.get("success_rate").and_then(serde_json::Value::as_f64) != Some(0.0) {
        return Err(format!("Expected no successes: {}", value));
    }
    Ok(())
}

#[test]
fn e2e_cli_reports_connection_failures() -> Result<(), String> {
    let url = closed_port_url()?;

    let output = run_hit(["-n", "3", "--output-format", "json", url.as_str()])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let value = json_summary(&output)?;
    if value.get("error_count").and_then(serde_json::Value::as_u64) != Some(3) {
        return Err(format!("Expected 3 errors: {}", value));
    }
    Ok(())
}

#[test]
fn e2e_cli_tuned_client_does_not_follow_redirects() -> Result<(), String> {
    // Following the redirect would end in a connection error.
    let server = spawn_http_server(
        Reply::status(302, "Found").with_location("http://127.0.0.1:1/moved"),
    )?;

    let output = run_hit([
        "-n",
        "2",
        "--client",
        "enabled",
        "--output-format",
        "json",
        server.url(),
    ])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if server.hits() != 2 {
        return Err(format!("Expected 2 hits, got {}", server.hits()));
    }
    let value = json_summary(&output)?;
    if value.get("error_count").and_then(serde_json::Value::as_u64) != Some(0) {
        return Err(format!("Redirect was followed: {}", value));
    }
    Ok(())
}

#[test]
fn e2e_cli_dry_run_sends_nothing() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK"))?;
    let url = server.url().to_owned();

    let output = run_hit(["--dry-run", "-n", "5", url.as_str()])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if server.hits() != 0 {
        return Err(format!("Dry run sent {} requests", server.hits()));
    }
    if !String::from_utf8_lossy(&output.stdout).contains("Sending 5 requests") {
        return Err(describe(&output));
    }
    Ok(())
}

#[test]
fn e2e_cli_rejects_invalid_arguments() -> Result<(), String> {
    let cases: [&[&str]; 4] = [
        &["localhost:8080"],
        &["-n", "2", "-c", "3", "http://127.0.0.1:9/"],
        &["-n", "0", "http://127.0.0.1:9/"],
        &["--rps", "fast", "http://127.0.0.1:9/"],
    ];
    for args in cases {
        let output = run_hit(args)?;
        if output.status.success() {
            return Err(format!("Expected {:?} to fail\n{}", args, describe(&output)));
        }
    }
    Ok(())
}

#[test]
fn e2e_cli_respects_rps() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK"))?;
    let url = server.url().to_owned();

    let started = Instant::now();
    let output = run_hit(["-n", "6", "-c", "3", "--rps", "20", url.as_str()])?;
    let elapsed = started.elapsed();
    if !output.status.success() {
        return Err(describe(&output));
    }
    if server.hits() != 6 {
        return Err(format!("Expected 6 hits, got {}", server.hits()));
    }
    // Six requests at 20/s take at least five full intervals.
    if elapsed < Duration::from_millis(250) {
        return Err(format!("Run finished too fast: {:?}", elapsed));
    }
    Ok(())
}

#[test]
fn e2e_cli_deadline_interrupts_run() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK").with_delay(Duration::from_millis(100)))?;
    let url = server.url().to_owned();

    let output = run_hit(["-n", "50", "-c", "1", "--deadline", "350ms", url.as_str()])?;
    if output.status.success() {
        return Err(format!("Expected a failed run\n{}", describe(&output)));
    }
    if server.hits() >= 50 {
        return Err(format!("Deadline was ignored: {} hits", server.hits()));
    }
    if !String::from_utf8_lossy(&output.stdout).contains("Summary:") {
        return Err(format!("Expected a partial summary\n{}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_cli_reads_config_file() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK"))?;
    let url = server.url().to_owned();
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("load.toml");
    fs::write(
        &path,
        format!("url = \"{}\"\nrequests = 4\nconcurrency = 2\n", url),
    )
    .map_err(|err| format!("write config failed: {}", err))?;
    let path = path.to_string_lossy().into_owned();

    let output = run_hit(["--config", path.as_str(), "-n", "3"])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if server.hits() != 3 {
        return Err(format!(
            "Command-line -n must win over the config: {} hits",
            server.hits()
        ));
    }
    Ok(())
}

#[test]
fn e2e_cli_picks_up_default_config() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK"))?;
    let url = server.url().to_owned();
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    fs::write(
        dir.path().join("hit.json"),
        format!("{{\"url\": \"{}\", \"requests\": 2}}", url),
    )
    .map_err(|err| format!("write config failed: {}", err))?;

    let output = run_hit_in(Vec::<&str>::new(), Some(dir.path()))?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if server.hits() != 2 {
        return Err(format!("Expected 2 hits, got {}", server.hits()));
    }
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))
}

#[test]
fn e2e_library_summarizes_a_run() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK").with_delay(Duration::from_millis(2)))?;
    let url = server.url().to_owned();
    let summary = runtime()?.block_on(async {
        let template = RequestTemplate::parse(Method::GET, &url)
            .map_err(|err| format!("template failed: {}", err))?;
        let scope = CancelToken::new();
        let options = Options {
            concurrency: 4,
            ..Options::default()
        };
        let mut results = send_n(&scope, 20, template, options)
            .map_err(|err| format!("send_n failed: {}", err))?;
        let summary = summarize(&mut results).await;
        results
            .close()
            .await
            .map_err(|err| format!("close failed: {}", err))?;
        Ok::<_, String>(summary)
    })?;

    if server.hits() != 20 || summary.total_requests != 20 {
        return Err(format!(
            "hits {}, summarized {}",
            server.hits(),
            summary.total_requests
        ));
    }
    if summary.error_count != 0 || summary.total_bytes != 40 {
        return Err(format!("Unexpected summary: {:?}", summary));
    }
    if summary.fastest > summary.slowest || summary.latency.p50 > summary.latency.p99 {
        return Err(format!("Inconsistent latencies: {:?}", summary));
    }
    Ok(())
}

#[test]
fn e2e_library_stock_client_and_early_stop() -> Result<(), String> {
    let server = spawn_http_server(Reply::ok("OK").with_delay(Duration::from_millis(5)))?;
    let url = server.url().to_owned();
    let received = runtime()?.block_on(async {
        let template = RequestTemplate::parse(Method::GET, &url)
            .map_err(|err| format!("template failed: {}", err))?;
        let scope = CancelToken::new();
        let options = Options {
            concurrency: 2,
            client_tuning: ClientTuning::Disabled,
            ..Options::default()
        };
        let results = send_n(&scope, 1_000, template, options)
            .map_err(|err| format!("send_n failed: {}", err))?;
        let mut seen = 0_u32;
        results
            .consume(|_| {
                seen = seen.saturating_add(1);
                if seen >= 4 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await
            .map_err(|err| format!("Stopping early must not fail: {}", err))
    })?;

    if received != 4 {
        return Err(format!("Expected 4 results, got {}", received));
    }
    // At most the in-flight requests reach the server after the stop.
    if server.hits() > 8 {
        return Err(format!("Run kept going after close: {} hits", server.hits()));
    }
    Ok(())
}
