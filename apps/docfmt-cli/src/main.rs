//! docfmt command-line client
//!
//! Drives the upload, check, format and configuration flows against a
//! running docfmt server. Progress and failures are printed as notices on
//! stderr; reports and exported files go to stdout or disk.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use docfmt_client::flows::EXPORT_FILE_NAME;
use docfmt_client::{
    ClientError, ConsoleNotifier, Flows, HttpBackend, LocalFile, Notifier, ReportView, Session,
};
use docfmt_types::Margin;
use tracing::{debug, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type CliFlows = Flows<HttpBackend, ConsoleNotifier>;

/// Used when the server's file name has no usable final component
const FORMATTED_FALLBACK_NAME: &str = "formatted.docx";

#[derive(Parser, Debug)]
#[command(name = "docfmt", version, about = "Check and format thesis documents")]
struct Cli {
    /// Base URL of the docfmt server
    #[arg(long, global = true, env = "DOCFMT_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the server's preset templates.
    Templates,
    /// Upload a document and print its format check report.
    Check(CheckArgs),
    /// Upload a document, format it and download the result.
    Format(FormatArgs),
    /// Write the effective configuration to a JSON file.
    ExportConfig(ExportArgs),
    /// Validate a configuration file and print its canonical form.
    ImportConfig(ImportArgs),
}

/// Where the configuration comes from and which margins to override
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// Template to start from (defaults to the server's default template)
    #[arg(long)]
    template: Option<String>,
    /// Configuration file to import instead of a template
    #[arg(long, conflicts_with = "template")]
    config: Option<PathBuf>,
    /// Top margin in cm
    #[arg(long)]
    top: Option<f64>,
    /// Bottom margin in cm
    #[arg(long)]
    bottom: Option<f64>,
    /// Left margin in cm
    #[arg(long)]
    left: Option<f64>,
    /// Right margin in cm
    #[arg(long)]
    right: Option<f64>,
}

impl ConfigArgs {
    fn margins(&self) -> [(Margin, Option<f64>); 4] {
        [
            (Margin::Top, self.top),
            (Margin::Bottom, self.bottom),
            (Margin::Left, self.left),
            (Margin::Right, self.right),
        ]
    }
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Path to the .docx document
    file: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
    /// Also write the report as an HTML page
    #[arg(long)]
    html: Option<PathBuf>,
    /// Print the raw report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Path to the .docx document
    file: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
    /// Directory for the formatted document
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Output file
    #[arg(long, default_value = EXPORT_FILE_NAME)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Configuration file to validate
    file: PathBuf,
    /// Write the canonical configuration here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Load templates, then apply the requested template, file and margins
async fn prepare_session(flows: &CliFlows, args: &ConfigArgs) -> anyhow::Result<Session> {
    let mut session = Session::new();

    // Without templates the session starts from an empty configuration
    let _ = flows.load_templates(&mut session).await;

    if let Some(name) = &args.template {
        flows.select_template(&mut session, name)?;
    }
    if let Some(path) = &args.config {
        let text = read_text(path).await?;
        flows.import_config(&mut session, &text).await?;
    }
    for (side, cm) in args.margins() {
        if cm.is_some() {
            session.margins.set(side, cm);
        }
    }

    debug!("effective config: {:?}", session.effective_config());
    Ok(session)
}

async fn read_text(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

async fn upload(flows: &CliFlows, session: &mut Session, path: &Path) -> anyhow::Result<()> {
    let file = match LocalFile::read(path).await {
        Ok(file) => file,
        Err(ClientError::Io(e)) => {
            return Err(anyhow!("failed to read {}: {}", path.display(), e));
        }
        Err(err) => {
            flows.notifier().error(&err.to_string());
            return Err(err.into());
        }
    };
    flows.upload(session, file).await?;
    Ok(())
}

/// Place a server-supplied file name inside `dir`, dropping any directories
fn output_path(dir: &Path, filename: &str) -> PathBuf {
    let name = Path::new(filename)
        .file_name()
        .unwrap_or_else(|| OsStr::new(FORMATTED_FALLBACK_NAME));
    dir.join(name)
}

async fn run_templates(flows: &CliFlows) -> anyhow::Result<()> {
    let mut session = Session::new();
    flows
        .load_templates(&mut session)
        .await
        .map_err(|e| anyhow!("failed to load templates: {}", e))?;

    for template in &session.templates {
        let marker = if session.default_template.as_deref() == Some(template.name.as_str()) {
            "*"
        } else {
            " "
        };
        if template.description.is_empty() {
            println!("{} {}", marker, template.name);
        } else {
            println!("{} {} - {}", marker, template.name, template.description);
        }
    }
    Ok(())
}

async fn run_check(flows: &CliFlows, args: &CheckArgs) -> anyhow::Result<()> {
    let mut session = prepare_session(flows, &args.config).await?;
    upload(flows, &mut session, &args.file).await?;
    let report = flows.check(&mut session).await?;
    let view = ReportView::new(&report);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", view.render_text());
    }

    if let Some(path) = &args.html {
        let title = format!("Format check: {}", args.file.display());
        write_file(path, view.render_html_document(&title).as_bytes()).await?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

async fn run_format(flows: &CliFlows, args: &FormatArgs) -> anyhow::Result<()> {
    let mut session = prepare_session(flows, &args.config).await?;
    upload(flows, &mut session, &args.file).await?;
    flows.format(&mut session).await?;

    let file = flows.download(&session).await?;
    let path = output_path(&args.out, &file.filename);
    write_file(&path, &file.contents).await?;
    println!("{}", path.display());
    Ok(())
}

async fn run_export(flows: &CliFlows, args: &ExportArgs) -> anyhow::Result<()> {
    let session = prepare_session(flows, &args.config).await?;
    let text = flows.export_config(&session).await?;
    write_file(&args.out, text.as_bytes()).await?;
    println!("{}", args.out.display());
    Ok(())
}

async fn run_import(flows: &CliFlows, args: &ImportArgs) -> anyhow::Result<()> {
    let mut session = Session::new();
    let text = read_text(&args.file).await?;
    let config = flows.import_config(&mut session, &text).await?;
    let canonical = serde_json::to_string_pretty(&config)?;

    match &args.out {
        Some(path) => {
            write_file(path, canonical.as_bytes()).await?;
            println!("{}", path.display());
        }
        None => println!("{}", canonical),
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let flows = Flows::new(
        HttpBackend::new(cli.server.as_str()),
        ConsoleNotifier::default(),
    );

    match &cli.command {
        Command::Templates => run_templates(&flows).await,
        Command::Check(args) => run_check(&flows, args).await,
        Command::Format(args) => run_format(&flows, args).await,
        Command::ExportConfig(args) => run_export(&flows, args).await,
        Command::ImportConfig(args) => run_import(&flows, args).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Using server {}", cli.server);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Flow failures were already shown as notices
            if err.downcast_ref::<ClientError>().is_none() {
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
