use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, warn};
use url::Url;

use crate::args::HitArgs;
use crate::config::{DEFAULT_CONFIG_FILES, apply_config, load_config};
use crate::error::{AppError, AppResult, RunError, ValidationError};
use crate::http::RequestTemplate;
use crate::options::Options;
use crate::pipeline::send_n;
use crate::shutdown::CancelToken;
use crate::shutdown_handlers::setup_signal_shutdown_handler;
use crate::summary::{Summary, summarize};
use crate::system::{banner, logger, summary_output};

/// A validated invocation, ready to run.
struct RunPlan {
    url: String,
    requests: u64,
    template: RequestTemplate,
    options: Options,
}

impl RunPlan {
    fn from_args(args: &HitArgs) -> AppResult<Self> {
        let url = args.url.clone().ok_or_else(|| {
            tracing::error!("Missing URL (pass it as an argument or set url in the config).");
            AppError::validation(ValidationError::MissingUrl)
        })?;
        let parsed = validate_url(&url)?;

        let requests = args.requests.get();
        let concurrency = args.concurrency.get();
        if requests < u64::try_from(concurrency).unwrap_or(u64::MAX) {
            return Err(AppError::validation(
                ValidationError::RequestsBelowConcurrency {
                    requests,
                    concurrency,
                },
            ));
        }

        let mut template = RequestTemplate::new(args.method.to_method(), parsed);
        for (name, value) in &args.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                AppError::validation(ValidationError::InvalidHeaderName {
                    name: name.clone(),
                    source: err,
                })
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|err| {
                AppError::validation(ValidationError::InvalidHeaderValue {
                    name: name.clone(),
                    source: err,
                })
            })?;
            template = template.with_header(header_name, header_value);
        }
        if let Some(data) = args.data.as_ref() {
            template = template.with_body(data.clone());
        }

        let options = Options {
            concurrency,
            rate_per_second: args.rps.map_or(0, u64::from),
            client_tuning: args.client.into(),
            timeout: args.timeout,
            deadline: args.deadline,
            ..Options::default()
        };

        Ok(Self {
            url,
            requests,
            template,
            options,
        })
    }
}

/// Entry point of the `hit` binary.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, when the run
/// cannot start, and when the run was interrupted before finishing.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    logger::init_logging(args.verbose, args.no_color);

    let plan = RunPlan::from_args(&args)?;

    let mut stdout = std::io::stdout().lock();
    banner::write_banner(&mut stdout)?;
    banner::write_plan(
        &mut stdout,
        plan.requests,
        &plan.url,
        plan.options.concurrency,
    )?;
    stdout.flush()?;
    if args.dry_run {
        return Ok(());
    }

    let runtime = build_runtime()?;

    let outcome = runtime.block_on(run_hit(plan));
    log_alive_tasks(&runtime);

    let (summary, closed) = match outcome {
        Ok(finished) => finished,
        Err(err) => {
            eprintln!("\nerror occurred: {}", err);
            return Err(err);
        }
    };
    summary_output::write_summary(&mut stdout, &summary, args.output_format)?;
    stdout.flush()?;

    if let Err(err) = closed {
        eprintln!("\nerror occurred: {}", err);
        return Err(err.into());
    }
    Ok(())
}

fn parse_args() -> AppResult<Option<(HitArgs, ArgMatches)>> {
    let mut cmd = HitArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = HitArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn validate_url(url: &str) -> AppResult<Url> {
    let parsed = Url::parse(url).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: url.to_owned(),
            source: err,
        })
    })?;
    if parsed.scheme().is_empty() || parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::validation(
            ValidationError::UrlMissingSchemeOrHost {
                url: url.to_owned(),
            },
        ));
    }
    Ok(parsed)
}

/// Runs the plan under a signal-aware scope and summarizes every result.
///
/// The summary is returned even when the run was interrupted, next to the
/// outcome of closing the run.
async fn run_hit(plan: RunPlan) -> AppResult<(Summary, Result<u64, RunError>)> {
    let scope = CancelToken::new();
    let signals = setup_signal_shutdown_handler(&scope);

    let started = send_n(&scope, plan.requests, plan.template, plan.options);
    let mut results = match started {
        Ok(results) => results,
        Err(err) => {
            scope.cancel();
            drop(signals.await);
            return Err(err.into());
        }
    };
    let summary = summarize(&mut results).await;
    let closed = results.close().await;

    // Releases the signal handler.
    scope.cancel();
    if let Err(err) = signals.await {
        warn!("Signal handler failed: {}", err);
    }
    Ok((summary, closed))
}

fn build_runtime() -> AppResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| AppError::Runtime { source })
}

fn log_alive_tasks(runtime: &tokio::runtime::Runtime) {
    let alive = runtime.metrics().num_alive_tasks();
    if alive > 0 {
        warn!(alive, "tasks still alive after the run");
    } else {
        debug!(alive, "runtime tasks at exit");
    }
}
