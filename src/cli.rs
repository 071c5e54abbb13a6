//! Command-line interface for the harvester.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::client::Client;
use crate::dc::DublinCoreRecords;
use crate::error::{HarvestError, Result};
use crate::types::{ListMetadataFormatsOptions, ListOptions, ListSetsOptions};

/// OAI Harvester - Harvest metadata records from OAI-PMH repositories.
#[derive(Parser)]
#[command(name = "oai-harvest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Repository base URL (e.g. http://eprints.ecs.soton.ac.uk/cgi/oai2)
    pub base_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the repository's self-description (Identify).
    Identify,

    /// List the metadata formats the repository supports.
    Formats {
        /// Restrict to formats available for one item
        #[arg(short, long)]
        identifier: Option<String>,
    },

    /// List the repository's sets.
    Sets,

    /// List record identifiers matching the filters.
    Identifiers {
        /// Metadata prefix (e.g. oai_dc)
        #[arg(short = 'p', long, default_value = "oai_dc")]
        metadata_prefix: String,

        /// Lower datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        from: Option<String>,

        /// Upper datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        until: Option<String>,

        /// Restrict to one set
        #[arg(short, long)]
        set: Option<String>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Harvest Dublin Core records, following resumption tokens.
    Harvest {
        /// Metadata prefix (e.g. oai_dc)
        #[arg(short = 'p', long, default_value = "oai_dc")]
        metadata_prefix: String,

        /// Lower datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        from: Option<String>,

        /// Upper datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        until: Option<String>,

        /// Restrict to one set
        #[arg(short, long)]
        set: Option<String>,

        /// Write harvested records to this YAML file instead of printing titles
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new(cli.base_url.as_str())?;

    match cli.command {
        Commands::Identify => identify_command(&client),
        Commands::Formats { identifier } => formats_command(&client, identifier),
        Commands::Sets => sets_command(&client),
        Commands::Identifiers {
            metadata_prefix,
            from,
            until,
            set,
            max_pages,
        } => {
            let options = first_page_options(metadata_prefix, from, until, set)?;
            identifiers_command(&client, options, max_pages)
        }
        Commands::Harvest {
            metadata_prefix,
            from,
            until,
            set,
            output,
            max_pages,
        } => {
            let options = first_page_options(metadata_prefix, from, until, set)?;
            harvest_command(&client, options, output.as_deref(), max_pages)
        }
    }
}

/// Parse a date argument: a bare date means midnight UTC.
fn parse_datetime_arg(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    Err(HarvestError::InvalidDate(value.to_string()))
}

/// Build first-page list options from CLI arguments.
fn first_page_options(
    metadata_prefix: String,
    from: Option<String>,
    until: Option<String>,
    set: Option<String>,
) -> Result<ListOptions> {
    Ok(ListOptions {
        metadata_prefix: Some(metadata_prefix),
        from: from.as_deref().map(parse_datetime_arg).transpose()?,
        until: until.as_deref().map(parse_datetime_arg).transpose()?,
        set,
        resumption_token: None,
    })
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn identify_command(client: &Client) -> Result<()> {
    let pb = spinner("Contacting repository...");
    let response = client.identify();
    pb.finish_and_clear();
    let response = response?;

    let info = &response.identify;
    println!("{} {}", style("Repository:").bold(), style(&info.repository_name).cyan());
    println!("  Base URL: {}", info.base_url);
    println!("  Protocol version: {}", info.protocol_version);
    println!("  Earliest datestamp: {}", info.earliest_datestamp);
    println!("  Deleted records: {}", info.deleted_record);
    println!("  Granularity: {}", info.granularity);
    if !info.admin_email.is_empty() {
        println!("  Admin email: {}", info.admin_email);
    }
    if !info.compression.is_empty() {
        println!("  Compression: {}", info.compression);
    }

    Ok(())
}

fn formats_command(client: &Client, identifier: Option<String>) -> Result<()> {
    let pb = spinner("Listing metadata formats...");
    let response = client.list_metadata_formats(&ListMetadataFormatsOptions { identifier });
    pb.finish_and_clear();
    let response = response?;

    println!(
        "{} {}",
        style(response.formats.len()).bold(),
        style("metadata formats").bold()
    );
    for format in &response.formats {
        println!(
            "  {} ({})",
            style(&format.metadata_prefix).cyan(),
            format.metadata_namespace
        );
    }

    Ok(())
}

fn sets_command(client: &Client) -> Result<()> {
    let pb = spinner("Listing sets...");
    let mut options = ListSetsOptions::default();
    let mut total = 0usize;

    loop {
        let response = match client.list_sets(&options) {
            Ok(response) => response,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };

        for set in &response.sets {
            pb.suspend(|| println!("  {}  {}", style(&set.spec).cyan(), set.name));
        }
        total += response.sets.len();

        match response.next_token() {
            Some(token) => {
                options = ListSetsOptions {
                    resumption_token: Some(token.to_string()),
                };
            }
            None => break,
        }
    }

    pb.finish_and_clear();
    println!("{} {}", style(total).bold(), style("sets").bold());
    Ok(())
}

fn identifiers_command(
    client: &Client,
    mut options: ListOptions,
    max_pages: Option<u32>,
) -> Result<()> {
    let pb = spinner("Listing identifiers...");
    let mut pages = 0u32;
    let mut total = 0usize;

    loop {
        let response = match client.list_identifiers(&options) {
            Ok(response) => response,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };

        for header in &response.headers {
            let marker = if header.is_deleted() { " (deleted)" } else { "" };
            pb.suspend(|| println!("{}  {}{}", header.datestamp, header.identifier, marker));
        }
        total += response.headers.len();
        pages += 1;

        let done = max_pages.is_some_and(|max| pages >= max);
        match response.next_token() {
            Some(token) if !done => options = ListOptions::from_resumption_token(token),
            _ => break,
        }
    }

    pb.finish_and_clear();
    println!(
        "{} {} ({} pages)",
        style(total).bold(),
        style("identifiers").bold(),
        pages
    );
    Ok(())
}

fn harvest_command(
    client: &Client,
    mut options: ListOptions,
    output: Option<&std::path::Path>,
    max_pages: Option<u32>,
) -> Result<()> {
    // Validate the output location before any HTTP request.
    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(HarvestError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Output directory does not exist: {}", parent.display()),
                )));
            }
        }
    }

    println!(
        "{} from {}",
        style("Harvesting").bold(),
        style(client.base_url()).cyan()
    );

    let pb = spinner("Fetching records...");
    let mut harvested = DublinCoreRecords::default();
    let mut warnings: Vec<String> = Vec::new();
    let mut pages = 0u32;

    loop {
        let mut page = DublinCoreRecords::default();
        let response = match client.list_records(&options, &mut page) {
            Ok(response) => response,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };

        if output.is_none() {
            for record in &page.records {
                if let Some(title) = record.titles.first() {
                    pb.suspend(|| println!("title: {title}"));
                }
            }
        }

        harvested.records.extend(page.records);
        warnings.extend(response.decode_warnings.iter().cloned());
        pages += 1;
        pb.set_message("Fetching records...");

        let done = max_pages.is_some_and(|max| pages >= max);
        match response.next_token() {
            Some(token) if !done => options = ListOptions::from_resumption_token(token),
            _ => break,
        }
    }

    pb.finish_and_clear();

    println!(
        "{} {} records over {} pages",
        style("Harvested").green().bold(),
        harvested.records.len(),
        pages
    );
    if !warnings.is_empty() {
        println!(
            "  Warnings: {}",
            style(warnings.len()).yellow().bold()
        );
        for warning in &warnings {
            println!("    {warning}");
        }
    }

    if let Some(path) = output {
        let yaml = serde_yaml_ng::to_string(&harvested)?;
        std::fs::write(path, yaml)?;
        println!("{} {}", style("Saved to:").green().bold(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_cli_parse_harvest() {
        let cli = Cli::parse_from(["oai-harvest", "http://example.org/oai", "harvest"]);

        assert_eq!(cli.base_url, "http://example.org/oai");
        let Commands::Harvest {
            metadata_prefix,
            output,
            max_pages,
            ..
        } = cli.command
        else {
            panic!("expected harvest command");
        };
        assert_eq!(metadata_prefix, "oai_dc");
        assert!(output.is_none());
        assert!(max_pages.is_none());
    }

    #[test]
    fn test_cli_parse_identifiers_with_filters() {
        let cli = Cli::parse_from([
            "oai-harvest",
            "http://example.org/oai",
            "identifiers",
            "--from",
            "2016-01-01",
            "--set",
            "math",
        ]);

        let Commands::Identifiers { from, set, .. } = cli.command else {
            panic!("expected identifiers command");
        };
        assert_eq!(from, Some("2016-01-01".to_string()));
        assert_eq!(set, Some("math".to_string()));
    }

    #[test]
    fn test_parse_datetime_arg_bare_date() {
        let t = parse_datetime_arg("2016-03-26").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2016, 3, 26, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_datetime_arg_full_timestamp() {
        let t = parse_datetime_arg("2016-03-26T18:17:43Z").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2016, 3, 26, 18, 17, 43).unwrap());
    }

    #[test]
    fn test_parse_datetime_arg_invalid() {
        assert!(parse_datetime_arg("yesterday").is_err());
        assert!(parse_datetime_arg("2016-13-01").is_err());
    }
}
