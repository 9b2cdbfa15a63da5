use clap::{Parser, Subcommand};
use minisite::changes::XmlChangelog;
use minisite::site::Site;
use minisite::sources::SourcesRegistry;
use minisite::{config, generate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "minisite")]
#[command(about = "Static project site generator")]
#[command(long_about = "\
Static project site generator

Reads a declarative site.toml describing a software project (name, version,
modules, and optional attachments) and produces a single XHTML project page
plus an Atom release feed.

Attachments and the sections they enable:

  overview       XHTML fragment  → overview block content
  features       XHTML fragment  → \"Features\"
  header         XHTML fragment  → banner above the page
  documentation  named items     → \"Documentation\"
  changelog      XML file        → \"Changes\" + releases.atom
  sources        system + uri    → \"Sources\"
  license        plain text      → \"License\"
  bug_tracker    system + uri    → \"Bug Tracker\"

Sections absent from the configuration are absent from the page and from
its table of contents.

Run 'minisite gen-config' to print a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "site.toml", global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "minisite", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the site
    Build,
    /// Validate the configuration and every referenced attachment
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.config)?;
            generate::generate(&config, &cli.output)?;
            println!("Site generated at {}", cli.output.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            // Assembling the document exercises every attachment: fragments
            // parse, the changelog parses, the license is readable, and the
            // sources system has a provider.
            let registry = SourcesRegistry::with_defaults();
            let renderer = XmlChangelog;
            Site::new(&config, &registry)
                .with_changelog(&renderer)
                .document()?;
            println!("Configuration is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
