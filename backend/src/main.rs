//! Routine Import CLI - Turn routine CSV files into dashboard routines
//!
//! # Main Commands
//!
//! ```bash
//! routine-import import rutina.csv --format sameVariable --mapping mapping.json
//! routine-import import rutina.csv --format exercisePerSet   # template or guessed mapping
//! routine-import mapping list                                # manage saved mappings
//! ```
//!
//! # Helper Commands
//!
//! ```bash
//! routine-import read rutina.csv        # Raw table as JSON
//! routine-import suggest rutina.csv     # Guess a mapping from the headers
//! routine-import validate routine.json  # Check a formatted routine
//! routine-import fields                 # List mappable fields
//! ```

use clap::{Parser, Subcommand};
use routine_import::logs::LOG_BROADCASTER;
use routine_import::{
    import_file, read_file, resolve_mapping, suggest_mapping, validate_formatted_routine,
    CsvFormat, FieldMapping, FieldName, ImportOptions, MappingOrigin, MappingRegistry,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "routine-import")]
#[command(about = "Import workout routines from CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Hide pipeline progress logs
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a CSV file and output its raw table as JSON
    Read {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full import: CSV -> rows -> grouped routine JSON
    Import {
        /// Input CSV file
        input: PathBuf,

        /// commaDelimited, sameVariable or exercisePerSet
        /// (default: the format stored with the matched template)
        #[arg(short, long)]
        format: Option<CsvFormat>,

        /// Mapping JSON file ({"0": "ejercicios", "1": "repeticiones", ...})
        #[arg(short, long, conflicts_with = "template")]
        mapping: Option<PathBuf>,

        /// Use a saved mapping template
        #[arg(short, long)]
        template: Option<String>,

        /// Guess the mapping from the headers, ignoring saved templates
        #[arg(long, conflicts_with_all = ["mapping", "template"])]
        suggest: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output the full report (warnings, skipped rows) instead of the routine
        #[arg(long)]
        report: bool,

        /// Fail on cells that cannot be read as numbers
        #[arg(long)]
        strict: bool,

        /// Skip schema validation
        #[arg(long)]
        no_validate: bool,

        /// Save the mapping used as a template under this name
        #[arg(long)]
        save_mapping: Option<String>,
    },

    /// Suggest a mapping from the CSV headers
    Suggest {
        /// Input CSV file
        input: PathBuf,
    },

    /// Validate a formatted routine JSON file
    Validate {
        /// Input JSON file
        input: PathBuf,
    },

    /// List the fields a column can be mapped to
    Fields,

    /// Manage saved mapping templates
    Mapping {
        #[command(subcommand)]
        action: MappingAction,
    },
}

#[derive(Subcommand)]
enum MappingAction {
    /// List all stored mappings
    List,

    /// Import a mapping JSON file as template
    Import {
        /// Mapping JSON file to import
        file: PathBuf,
        /// Name for the template
        #[arg(short, long)]
        name: Option<String>,
        /// Format to store with the mapping
        #[arg(short, long)]
        format: Option<CsvFormat>,
        /// CSV file whose headers the template should match
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show details of a template
    Show {
        /// Template ID
        id: String,
    },

    /// Delete a template
    Delete {
        /// Template ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if cli.quiet {
        LOG_BROADCASTER.set_echo(false);
    }

    let result = match cli.command {
        Commands::Read { input, output } => cmd_read(&input, output.as_deref()),

        Commands::Import {
            input,
            format,
            mapping,
            template,
            suggest,
            output,
            report,
            strict,
            no_validate,
            save_mapping,
        } => {
            let args = ImportArgs {
                format,
                mapping,
                template,
                suggest,
                output,
                report,
                strict,
                no_validate,
                save_mapping,
            };
            cmd_import(&input, args).await
        }

        Commands::Suggest { input } => cmd_suggest(&input),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Fields => cmd_fields(),

        Commands::Mapping { action } => cmd_mapping(action),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

struct ImportArgs {
    format: Option<CsvFormat>,
    mapping: Option<PathBuf>,
    template: Option<String>,
    suggest: bool,
    output: Option<PathBuf>,
    report: bool,
    strict: bool,
    no_validate: bool,
    save_mapping: Option<String>,
}

fn cmd_read(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading CSV: {}", input.display());

    let result = read_file(input)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Columns: {}", result.table.headers.join(", "));
    eprintln!("✅ Read {} rows", result.table.rows.len());

    let json = serde_json::to_string_pretty(&result.table)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_import(input: &Path, args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let mut registry = MappingRegistry::new();

    // Explicit mapping file > named template > matching template > guess
    let (mapping, stored_format, template_id) = if let Some(ref path) = args.mapping {
        let content = fs::read_to_string(path)?;
        (FieldMapping::from_json_str(&content)?, None, None)
    } else if let Some(ref id) = args.template {
        let stored = registry
            .get(id)
            .ok_or_else(|| format!("Template not found: {}", id))?;
        eprintln!("   Template: {} ({})", stored.name, stored.id);
        (stored.mapping.clone(), stored.format, Some(stored.id.clone()))
    } else if args.suggest {
        let mapping = suggest_mapping(&read_file(input)?.table.headers);
        eprintln!("   Guessed mapping: {}", mapping.to_json()?.replace('\n', " "));
        (mapping, None, None)
    } else {
        let headers = read_file(input)?.table.headers;
        let resolved = resolve_mapping(&headers, &registry);
        let template_id = match resolved.origin {
            MappingOrigin::Template { id, .. } => Some(id),
            MappingOrigin::Suggested => {
                eprintln!("   Guessed mapping: {}", resolved.mapping.to_json()?.replace('\n', " "));
                None
            }
        };
        (resolved.mapping, resolved.format, template_id)
    };

    let format = args
        .format
        .or(stored_format)
        .ok_or("--format is required (commaDelimited, sameVariable or exercisePerSet)")?;

    let options = ImportOptions {
        skip_validation: args.no_validate,
        strict: args.strict,
    };

    let report = import_file(input, format, &mapping, &options).await?;

    if let Some(ref id) = template_id {
        registry.record_use(id)?;
    }

    if let Some(ref name) = args.save_mapping {
        let id = registry.save(mapping.clone(), Some(format), name, report.headers.clone())?;
        eprintln!("   💾 Mapping saved as template: {}", id);
    }

    eprintln!(
        "\n✨ {} exercises, {} sets ({} warnings, {} rows skipped)",
        report.routine.exercises.len(),
        report.entry_count,
        report.warnings.len(),
        report.skipped.len()
    );

    let json = if args.report {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string_pretty(&report.routine)?
    };
    write_output(&json, args.output.as_deref())?;

    Ok(())
}

fn cmd_suggest(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let result = read_file(input)?;
    let mapping = suggest_mapping(&result.table.headers);

    for (column, header) in result.table.headers.iter().enumerate() {
        let field = mapping
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, f)| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        eprintln!("   [{:2}] {:<20} → {}", column, header, field);
    }

    if !mapping.contains(FieldName::Exercise) {
        eprintln!("⚠️  No exercise column recognised; map 'ejercicios' by hand.");
    }

    println!("{}", mapping.to_json()?);
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let routine: Value = serde_json::from_str(&content)?;

    match validate_formatted_routine(&routine) {
        Ok(()) => {
            eprintln!("✅ Routine is valid");
            Ok(())
        }
        Err(errors) => {
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            Err(format!("{} validation errors", errors.len()).into())
        }
    }
}

fn cmd_fields() -> Result<(), Box<dyn std::error::Error>> {
    println!("{:<14} {:<8} DESCRIPTION", "FIELD", "KIND");
    for field in FieldName::ALL {
        println!(
            "{:<14} {:<8} {}",
            field.as_str(),
            format!("{:?}", field.kind()).to_lowercase(),
            field.description()
        );
    }
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn cmd_mapping(action: MappingAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = MappingRegistry::new();

    match action {
        MappingAction::List => {
            let mappings = registry.list();
            if mappings.is_empty() {
                eprintln!("📋 No mappings stored yet.");
                eprintln!("   Use 'routine-import mapping import <file>' to add one.");
                return Ok(());
            }

            eprintln!("📋 Stored mappings ({}):\n", mappings.len());
            for m in mappings {
                println!("  📄 {} ({})", m.name, m.id);
                println!("     Columns: {}", m.csv_columns.join(", "));
                if let Some(format) = m.format {
                    println!("     Format: {}", format);
                }
                println!("     Uses: {}", m.use_count);
                if let Some(ref last) = m.last_used {
                    println!("     Last used: {}", last);
                }
                println!();
            }
        }

        MappingAction::Import { file, name, format, csv } => {
            let csv_columns = match csv {
                Some(ref path) => read_file(path)?.table.headers,
                None => Vec::new(),
            };

            eprintln!("📥 Importing mapping from: {}", file.display());
            let id = registry.import(&file, name.as_deref(), format, csv_columns)?;
            eprintln!("✅ Mapping saved with ID: {}", id);
        }

        MappingAction::Show { id } => {
            let m = registry
                .get(&id)
                .ok_or_else(|| format!("Mapping not found: {}", id))?;
            println!("📄 Mapping: {} ({})\n", m.name, m.id);
            println!("CSV Columns: {}", m.csv_columns.join(", "));
            println!("Created: {}", m.created_at);
            println!("Uses: {}", m.use_count);
            println!("\nMapping:");
            println!("{}", m.mapping.to_json()?);
        }

        MappingAction::Delete { id } => {
            registry.delete(&id)?;
            eprintln!("🗑️  Mapping deleted: {}", id);
        }
    }

    Ok(())
}
