//! Command-line OAI-PMH harvester.
//!
//! Harvests one repository and writes each document as a JSON line to stdout
//! or to a file. Parameters come from an optional TOML file; flags override it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use oai_harvest::fetch::IDENTIFY_TIMEOUT;
use oai_harvest::{
    repository_name, FormatCatalog, HarvestParameters, HttpFetcher, OaiPmhHarvester,
    ParameterKey, RemoteFormatResolver,
};

#[derive(Debug, Parser)]
#[command(name = "oai-harvest", version, about = "Harvest OAI-PMH repositories into DataCite JSON")]
struct Cli {
    /// TOML file with harvest parameters.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Repository base URL.
    #[arg(long, global = true)]
    host_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the metadata prefixes the repository advertises.
    Formats,
    /// Print the repository name.
    Identify,
    /// Harvest records as JSON lines.
    Harvest {
        /// Metadata prefix to harvest.
        #[arg(short, long)]
        metadata_prefix: Option<String>,
        /// Lower datestamp bound.
        #[arg(long)]
        from: Option<String>,
        /// Upper datestamp bound.
        #[arg(long)]
        until: Option<String>,
        /// Repository identifier written into ISO 19139 documents.
        #[arg(long)]
        repository_identifier: Option<String>,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut parameters = match &cli.config {
        Some(path) => HarvestParameters::from_toml_file(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
        None => HarvestParameters::default(),
    };
    if let Some(host_url) = &cli.host_url {
        parameters.set(ParameterKey::HostUrl, host_url)?;
    }
    let host_url = parameters
        .host_url
        .clone()
        .context("The hostUrl parameter must be set (--host-url or config file)")?;

    match cli.command {
        Command::Formats => {
            let resolver = RemoteFormatResolver::new(HttpFetcher::new()?);
            let formats = resolver
                .try_resolve(&host_url)
                .with_context(|| format!("Failed to list metadata formats of {host_url}"))?;
            let catalog = FormatCatalog::new();
            for (prefix, schema) in formats.iter() {
                let marker = if catalog.supports(schema) { "*" } else { " " };
                println!("{marker} {prefix}\t{schema}");
            }
        },
        Command::Identify => {
            let fetcher = HttpFetcher::with_timeout(IDENTIFY_TIMEOUT)?;
            println!("{}", repository_name(&fetcher, &host_url));
        },
        Command::Harvest {
            metadata_prefix,
            from,
            until,
            repository_identifier,
            output,
        } => {
            for (key, value) in [
                (ParameterKey::MetadataPrefix, metadata_prefix),
                (ParameterKey::From, from),
                (ParameterKey::Until, until),
            ] {
                if let Some(value) = value {
                    parameters.set(key, &value)?;
                }
            }
            let catalog = match repository_identifier {
                Some(id) => FormatCatalog::with_repository_identifier(id),
                None => FormatCatalog::new(),
            };
            let harvester = OaiPmhHarvester::with_parameters(catalog, HttpFetcher::new()?, &parameters)
                .context("Cannot configure the harvester")?;

            let sink: Box<dyn Write> = match &output {
                Some(path) => Box::new(
                    File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                ),
                None => Box::new(io::stdout().lock()),
            };
            let mut sink = BufWriter::new(sink);
            let summary = harvester.harvest(|document| {
                serde_json::to_writer(&mut sink, &document)
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                sink.write_all(b"\n")?;
                Ok(())
            })?;
            sink.flush()?;
            eprintln!(
                "{}: {} records, {} documents, {} skipped",
                harvester.repository_name(),
                summary.records,
                summary.documents,
                summary.skipped
            );
        },
    }
    Ok(())
}
