//! docxtpl - fill placeholders in Word templates
//!
//! A command-line front end for docx-template.

use clap::{Parser, Subcommand};
use colored::*;
use docx_template::{DocxTemplate, Part, TemplateOptions, Variables};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Fill {placeholder} variables in .docx templates
#[derive(Parser)]
#[command(
    name = "docxtpl",
    version,
    about = "Fill placeholders in Word templates",
    long_about = "docxtpl - replace {key} placeholders in the body, headers and footers\n\
                  of a .docx template and write the result to a new file."
)]
struct Cli {
    /// Print debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a template and write the result
    Fill {
        /// Template file path
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Variable as key=value (repeatable, overrides --vars)
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        vars: Vec<(String, String)>,

        /// JSON file with an object of string values
        #[arg(long = "vars", value_name = "FILE")]
        vars_file: Option<PathBuf>,

        /// Replace placeholders without a value with empty text
        #[arg(long)]
        fill_all_gaps: bool,

        /// Directory for temporary files
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },

    /// List the placeholders of a template
    Vars {
        /// Template file path
        input: PathBuf,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Directory for temporary files
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "docx_template=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Fill {
            input,
            output,
            vars,
            vars_file,
            fill_all_gaps,
            temp_dir,
        } => {
            let mut variables = match vars_file {
                Some(path) => Variables::from_json(&fs::read_to_string(path)?)?,
                None => Variables::new(),
            };
            variables.extend(vars);

            let mut options = TemplateOptions::new().with_fill_all_gaps(fill_all_gaps);
            if let Some(dir) = temp_dir {
                options = options.with_temp_dir(dir)?;
            }

            let pb = create_spinner("Opening template...");
            let mut template = DocxTemplate::open_with_options(&input, &options)?;

            pb.set_message("Filling placeholders...");
            let missing: Vec<String> = template
                .all_variables()?
                .keys()
                .filter(|key| !variables.contains_key(key))
                .map(String::from)
                .collect();
            template.set_data(&variables, options.fill_all_gaps)?;

            pb.set_message("Saving...");
            template.save(&output)?;
            pb.finish_and_clear();

            println!(
                "{} Filled {} variables: {}",
                "✓".green().bold(),
                variables.len(),
                output.display()
            );
            if !missing.is_empty() {
                let verb = if fill_all_gaps { "Blanked" } else { "Left unfilled" };
                println!("{} {}: {}", "!".yellow().bold(), verb, missing.join(", "));
            }
        }

        Commands::Vars {
            input,
            json,
            temp_dir,
        } => {
            let mut options = TemplateOptions::new();
            if let Some(dir) = temp_dir {
                options = options.with_temp_dir(dir)?;
            }

            let pb = create_spinner("Scanning template...");

            let mut template = DocxTemplate::open_with_options(&input, &options)?;
            let mut per_part = Vec::new();
            for part in Part::ALL {
                let keys: Vec<String> = template
                    .read_all_variables(part)?
                    .keys()
                    .map(String::from)
                    .collect();
                per_part.push((part, keys));
            }

            pb.finish_and_clear();

            if json {
                let map: serde_json::Map<String, serde_json::Value> = per_part
                    .into_iter()
                    .map(|(part, keys)| (part.name().to_string(), keys.into()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                println!("{}", "Placeholders".cyan().bold());
                println!("{}", "─".repeat(40));
                for (part, keys) in per_part {
                    let list = if keys.is_empty() {
                        "-".dimmed().to_string()
                    } else {
                        keys.join(", ")
                    };
                    println!("{:>9}: {}", part.name().bold(), list);
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "docxtpl".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Placeholder substitution for Word (.docx) templates");
    println!();
    println!("Parts: document, header1, header2, footer1, footer2");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
