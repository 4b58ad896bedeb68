//! Command-line front end: parses arguments, runs one submission and renders
//! the outcome. All orchestration lives in `engine`.

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use tracing::info;

use crate::backend::KbClient;
use crate::config::Config;
use crate::engine::{
    AuthPolicy, Engine, Mode, Notice, Progress, QueryRequest, RunObserver, Strategy,
};
use crate::markdown::render_results;
use crate::records::ExportMapping;
use crate::records::export::default_file_name;
use crate::terms::{self, TermInput};

#[derive(Parser, Debug)]
#[command(
    name = "termscope",
    version,
    about = "Look up term definitions and term relations in a knowledge base."
)]
pub struct Cli {
    /// Knowledge base URL (overrides TERMSCOPE_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Stop the whole run on the first 401 instead of reporting it and continuing
    #[arg(long, global = true)]
    pub abort_on_auth_error: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up definitions for one or more terms
    Definition(QueryArgs),
    /// Look up relations between pairs of terms
    Relation(QueryArgs),
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Terms separated by `,` or `，` (2-100 characters)
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub query: Option<String>,

    /// JSON file holding an array of term strings, e.g. `["海浪", "风暴潮"]`
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Strategy::Joined)]
    pub strategy: Strategy,

    /// Write the export document to this path
    #[arg(long, short)]
    pub export: Option<PathBuf>,

    /// Never write an export document, not even for file input
    #[arg(long, conflicts_with = "export")]
    pub no_export: bool,
}

/// Progress bar and notices on stderr; results go to stdout.
#[derive(Default)]
struct TerminalProgress {
    drawn: bool,
}

impl RunObserver for TerminalProgress {
    fn on_progress(&mut self, progress: Progress) {
        let mut err = std::io::stderr();
        if progress.total == 0 {
            if self.drawn {
                let _ = writeln!(err);
                self.drawn = false;
            }
            return;
        }
        let _ = write!(
            err,
            "\r查询进度 {}/{} ({:.0}%)",
            progress.completed, progress.total, progress.percent
        );
        let _ = err.flush();
        self.drawn = true;
    }

    fn on_notice(&mut self, notice: &Notice) {
        if self.drawn {
            eprintln!();
            self.drawn = false;
        }
        eprintln!("{notice}");
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url)?;
    }
    if cli.abort_on_auth_error {
        config.auth_policy = AuthPolicy::Abort;
    }

    let (mode, args) = match cli.command {
        Command::Definition(args) => (Mode::Definition, args),
        Command::Relation(args) => (Mode::Relation, args),
    };

    let input = match (&args.file, &args.query) {
        (Some(path), _) => match terms::read_term_file(path, mode).await {
            Ok(input) => input,
            Err(e) => {
                eprintln!("{}", Notice::error(e.to_string()));
                return Ok(ExitCode::FAILURE);
            }
        },
        (None, Some(query)) => TermInput::Text(query.clone()),
        (None, None) => return Err("either a query or --file is required".into()),
    };
    let from_file = input.is_file();

    let http = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()?;
    let backend = KbClient::new(http, &config);
    let mut engine = Engine::new(backend, config.auth_policy);

    info!(base_url = %config.base_url, mode = ?mode, "submitting query");
    let request = QueryRequest {
        mode,
        strategy: args.strategy,
        input,
    };
    let report = engine
        .submit(&request, &mut TerminalProgress::default())
        .await;

    info!(notices = report.notices.len(), "run finished");
    let Some(results) = report.outcome.results() else {
        return Ok(ExitCode::FAILURE);
    };

    print!(
        "{}",
        render_results(mode, &results.display, report.outcome.failures())
    );

    if !results.export.is_empty() && !args.no_export && (args.export.is_some() || from_file) {
        let path = args.export.clone().unwrap_or_else(|| {
            PathBuf::from(default_file_name(mode, chrono::Local::now().date_naive()))
        });
        write_export(&path, &results.export).await?;
        eprintln!("{}", Notice::success(format!("已导出 {}", path.display())));
    }

    Ok(ExitCode::SUCCESS)
}

async fn write_export(path: &Path, export: &ExportMapping) -> Result<(), Box<dyn Error>> {
    let json = export.to_json_pretty()?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), entries = export.len(), "export written");
    Ok(())
}
