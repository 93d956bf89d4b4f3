use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env, Target};

use pagecheck::{
    AuditInputs, BrowserFetcher, ChromeLauncher, LighthouseCli, Orchestrator, SiteProvisioner,
};

/// Run a Lighthouse audit against a URL or a built site and fail the build
/// if it does not complete cleanly.
#[derive(Debug, Parser)]
#[command(name = "pagecheck", version)]
struct Cli {
    /// Externally reachable URL to audit
    #[arg(long, env = "AUDIT_URL")]
    audit_url: Option<String>,

    /// Build output directory to serve locally and audit
    #[arg(long, env = "PUBLISH_DIR")]
    publish_dir: Option<PathBuf>,

    /// Directory holding downloaded browser revisions
    #[arg(long, env = "PUPPETEER_CACHE_DIR")]
    browser_dir: Option<PathBuf>,

    /// Lighthouse CLI executable
    #[arg(long, env = "LIGHTHOUSE_PATH", default_value = "lighthouse")]
    lighthouse: PathBuf,
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();
    let cli = Cli::parse();

    let fetcher = match cli.browser_dir {
        Some(dir) => BrowserFetcher::with_dir(dir),
        None => BrowserFetcher::new(),
    };
    let orchestrator = Orchestrator::new(
        SiteProvisioner::new(),
        fetcher,
        ChromeLauncher::new(),
        LighthouseCli::with_program(cli.lighthouse),
    );

    let inputs = AuditInputs::new(cli.audit_url, cli.publish_dir);
    if let Some(report) = orchestrator.on_success(&inputs, None).await {
        match serde_json::to_string_pretty(report.as_value()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize report: {}", e),
        }
    }
}
