//! catadm CLI entry point.

use catadm::cli::commands::{self, CommandContext, Output};
use catadm::cli::{Cli, Commands};
use catadm::error::Error;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let json = cli.json;

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if let Some(hint) = e.hint() {
                eprintln!("Error: {e}\n  Hint: {hint}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    // Config is only resolved for commands that open the catalog.
    let ctx = || CommandContext::from_cli(cli, json);
    let out = Output::new(json, cli.quiet);

    match &cli.command {
        Commands::SetupDb => commands::setup_db::execute(&ctx()?),
        Commands::LoadRecords {
            path,
            recursive,
            yes,
        } => commands::load::execute(&ctx()?, path, *recursive, *yes),
        Commands::DeleteRecords { yes } => commands::delete::execute(&ctx()?, *yes),
        Commands::ExportRecords { path } => commands::export::execute(&ctx()?, path),
        Commands::RebuildDbIndexes => commands::maintenance::rebuild_indexes(&ctx()?),
        Commands::OptimizeDb => commands::maintenance::optimize(&ctx()?),
        Commands::RefreshHarvestedRecords { url, timeout } => {
            commands::harvest::execute(&ctx()?, url.as_deref(), *timeout)
        }
        Commands::GenSitemap { output, url } => {
            commands::sitemap::execute(&ctx()?, output, url.as_deref())
        }
        Commands::PostXml { url, xml, timeout } => {
            commands::post_xml::execute(&out, url, xml, *timeout)
        }
        Commands::ValidateXml { xml, xsd } => commands::validate::execute(&out, xml, xsd),
        Commands::GetSysprof => commands::sysprof::execute(&out),
    }
}
