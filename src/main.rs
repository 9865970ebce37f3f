// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Haukka CLI - DAST Engine Orchestrator
//!
//! Runs scans and health checks against a running engine.

use std::env;
use std::io::Write;
use std::process::ExitCode;

use anyhow::{bail, Context as _};
use tracing_subscriber::EnvFilter;

use haukka::{EngineConfig, Orchestrator, ScanPlan, Status, Target};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("haukka=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let options = match Options::parse(&args[2..]) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            return ExitCode::from(1);
        }
    };

    let result = match args[1].as_str() {
        "status" => check_status(&options).await,
        "version" => show_version(&options).await,
        "report" => write_report(&options).await,
        "scan" => run_scan(&options).await,
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" => {
            println!("haukka {}", haukka::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Haukka - DAST Engine Orchestrator

USAGE:
    haukka <COMMAND> [OPTIONS]

COMMANDS:
    status          Check that the engine API is reachable
    version         Show the engine version
    report          Print the engine's XML report of the current session
    scan <url>      Crawl and actively scan a target, print findings as JSON
    help            Show this help message

OPTIONS:
    --api <URL>         Engine control API (default: http://127.0.0.1:8080)
    --key <KEY>         Engine API key
    --depth <N>         Maximum crawl depth (scan only, default: 5)
    --api-spec <URL>    API specification to import before crawling (scan only)

EXAMPLES:
    haukka status --api http://zap:8080 --key changeme
    haukka scan https://example.com --depth 3
    haukka scan https://api.example.com --api-spec https://api.example.com/openapi.json
"#
    );
}

#[derive(Debug, Default)]
struct Options {
    url: Option<String>,
    api: Option<String>,
    key: Option<String>,
    depth: Option<u32>,
    api_spec: Option<String>,
}

impl Options {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut options = Options::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .with_context(|| format!("{} requires a value", flag))
            };
            match arg.as_str() {
                "--api" => options.api = Some(value("--api")?),
                "--key" => options.key = Some(value("--key")?),
                "--api-spec" => options.api_spec = Some(value("--api-spec")?),
                "--depth" => {
                    let raw = value("--depth")?;
                    options.depth = Some(
                        raw.parse()
                            .with_context(|| format!("invalid depth: {}", raw))?,
                    );
                }
                flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
                positional => {
                    if options.url.is_some() {
                        bail!("Unexpected argument: {}", positional);
                    }
                    options.url = Some(positional.to_string());
                }
            }
        }

        Ok(options)
    }

    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::new();
        if let Some(api) = &self.api {
            config = config.api_url(api.clone());
        }
        if let Some(key) = &self.key {
            config = config.api_key(key.clone());
        }
        config
    }
}

async fn check_status(options: &Options) -> anyhow::Result<ExitCode> {
    let engine = haukka::EngineClient::new(&options.engine_config())?;
    let detail = haukka::health::status_detail(&engine).await;

    println!("{}", serde_json::to_string_pretty(&detail)?);

    Ok(match detail.status {
        Status::Ok => ExitCode::SUCCESS,
        Status::Warning => ExitCode::from(2),
        Status::Error => ExitCode::from(1),
    })
}

async fn show_version(options: &Options) -> anyhow::Result<ExitCode> {
    let orchestrator = Orchestrator::connect(options.engine_config())
        .await
        .context("Failed to connect to engine")?;
    let version = orchestrator.version().await?;

    println!("haukka {}", haukka::VERSION);
    println!("engine {}", version);
    Ok(ExitCode::SUCCESS)
}

async fn write_report(options: &Options) -> anyhow::Result<ExitCode> {
    let orchestrator = Orchestrator::connect(options.engine_config())
        .await
        .context("Failed to connect to engine")?;
    let report = orchestrator.raw_report().await?;

    std::io::stdout().write_all(&report)?;
    Ok(ExitCode::SUCCESS)
}

async fn run_scan(options: &Options) -> anyhow::Result<ExitCode> {
    let Some(url) = options.url.as_deref() else {
        bail!("Usage: haukka scan <url> [--depth N] [--api-spec URL]");
    };
    url::Url::parse(url).with_context(|| format!("invalid target URL: {}", url))?;

    let orchestrator = Orchestrator::connect(options.engine_config())
        .await
        .context("Failed to connect to engine")?;

    let mut plan = ScanPlan::new(Target::new(url));
    if let Some(depth) = options.depth {
        plan = plan.max_depth(depth);
    }
    if let Some(spec) = &options.api_spec {
        plan = plan.api_spec_url(spec.clone());
    }

    let cancel = haukka::CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, stopping scan...");
            on_interrupt.cancel();
        }
    });

    let report = orchestrator.run_scan(&plan, Some(&cancel)).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!(
        "\n[+] {} crawled URLs, {} alerts",
        report.spider_findings.len(),
        report.scanner_findings.len()
    );
    Ok(ExitCode::SUCCESS)
}
