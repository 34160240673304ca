//! inifold CLI - Command-line interface for INI configuration files
//!
//! Usage:
//!   inifold get web url app.ini local.ini
//!   inifold dump app.ini --resolve --format json
//!   inifold set app.ini web port 8080

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indexmap::IndexMap;
use inifold_core::{Config, Options};
use tracing_subscriber::EnvFilter;

/// inifold - Ordered INI files with DEFAULT inheritance and variable unfolding
#[derive(Parser)]
#[command(name = "inifold")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    format: FormatArgs,

    /// Log loading and unfolding steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Formatting options applied when reading and writing files
#[derive(Args)]
struct FormatArgs {
    /// Comment marker for header lines: "# " or "; "
    #[arg(long, global = true, default_value = "# ")]
    comment: String,

    /// Separator between option and value: "=" or ":"
    #[arg(long, global = true, default_value = "=")]
    separator: String,

    /// Do not put a space before the separator
    #[arg(long, global = true)]
    no_pre_space: bool,

    /// Do not put a space after the separator
    #[arg(long, global = true)]
    no_post_space: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Get a single value
    Get {
        /// Section name (empty string for DEFAULT)
        section: String,

        /// Option name
        option: String,

        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the raw value without unfolding
        #[arg(long)]
        raw: bool,

        /// Convert the value before printing
        #[arg(short = 't', long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,

        /// Value printed when the lookup fails
        #[arg(short, long)]
        default: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = GetFormat::Text)]
        format: GetFormat,
    },

    /// List section names in order
    Sections {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List option names of a section
    Options {
        /// Section name
        section: String,

        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only the section's own options, without DEFAULT
        #[arg(long)]
        own: bool,
    },

    /// Export the whole configuration
    Dump {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Unfold variables before exporting
        #[arg(short, long)]
        resolve: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Ini)]
        format: DumpFormat,

        /// Header comment (INI output only)
        #[arg(long)]
        header: Option<String>,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set a value and save the file (created if missing)
    Set {
        /// File to edit
        file: PathBuf,

        /// Section name (empty string for DEFAULT)
        section: String,

        /// Option name
        option: String,

        /// Raw value to store
        value: String,

        /// Header comment written at the top of the file
        #[arg(long)]
        header: Option<String>,
    },

    /// Remove an option, or a whole section when no option is given
    Unset {
        /// File to edit
        file: PathBuf,

        /// Section name
        section: String,

        /// Option name
        option: Option<String>,
    },

    /// Quick syntax check
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValueType {
    String,
    Int,
    Float,
    Bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GetFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    Ini,
    Json,
    Yaml,
}

/// Exit code for lookup and unfolding failures
const EXIT_LOOKUP: u8 = 1;
/// Exit code for load, save and usage failures
const EXIT_LOAD: u8 = 2;

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    run_from(std::env::args_os())
}

/// Run the CLI with the given arguments (first item is the program name)
pub fn run_from<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_LOAD)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);

    let options = match Options::from_tokens(
        &cli.format.comment,
        &cli.format.separator,
        !cli.format.no_pre_space,
        !cli.format.no_post_space,
    ) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return ExitCode::from(EXIT_LOAD);
        }
    };

    match cli.command {
        Commands::Get {
            section,
            option,
            files,
            raw,
            value_type,
            default,
            format,
        } => cmd_get(&files, options, &section, &option, raw, value_type, default, format),

        Commands::Sections { files } => cmd_sections(&files, options),

        Commands::Options {
            section,
            files,
            own,
        } => cmd_options(&files, options, &section, own),

        Commands::Dump {
            files,
            resolve,
            format,
            header,
            output,
        } => cmd_dump(&files, options, resolve, format, header.as_deref(), output),

        Commands::Set {
            file,
            section,
            option,
            value,
            header,
        } => cmd_set(&file, options, &section, &option, &value, header.as_deref()),

        Commands::Unset {
            file,
            section,
            option,
        } => cmd_unset(&file, options, &section, option.as_deref()),

        Commands::Check { files } => cmd_check(&files, options),
    }
}

/// Install a stderr subscriber; `RUST_LOG` overrides the level
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(files: &[PathBuf], options: Options) -> Result<Config, String> {
    log::debug!("loading {} file(s)", files.len());
    Config::load_merged(files, options).map_err(|e| format!("Failed to load configuration: {}", e))
}

/// Load the file if it exists, otherwise start from an empty configuration
fn load_or_new(file: &Path, options: Options) -> Result<Config, String> {
    if file.exists() {
        Config::load_with_options(file, options)
            .map_err(|e| format!("Failed to load {}: {}", file.display(), e))
    } else {
        Ok(Config::with_options(options))
    }
}

fn typed_value(
    config: &Config,
    section: &str,
    option: &str,
    raw: bool,
    value_type: ValueType,
) -> inifold_core::Result<serde_json::Value> {
    if raw {
        return Ok(serde_json::Value::from(config.raw(section, option)?));
    }
    Ok(match value_type {
        ValueType::String => serde_json::Value::from(config.get_string(section, option)?),
        ValueType::Int => serde_json::Value::from(config.get_int(section, option)?),
        ValueType::Float => serde_json::Value::from(config.get_float(section, option)?),
        ValueType::Bool => serde_json::Value::from(config.get_bool(section, option)?),
    })
}

#[allow(clippy::too_many_arguments)]
fn cmd_get(
    files: &[PathBuf],
    options: Options,
    section: &str,
    option: &str,
    raw: bool,
    value_type: ValueType,
    default: Option<String>,
    format: GetFormat,
) -> ExitCode {
    let config = match load_config(files, options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(EXIT_LOAD);
        }
    };

    let value = match typed_value(&config, section, option, raw, value_type) {
        Ok(v) => v,
        Err(e) => match default {
            Some(default_val) => serde_json::Value::from(default_val),
            None => {
                eprintln!("{}: {}", "Error".red(), e);
                return ExitCode::from(EXIT_LOOKUP);
            }
        },
    };

    match format {
        GetFormat::Json => {
            let json = serde_json::json!({
                "section": section,
                "option": option,
                "value": value,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("{}: {}", "Error".red(), e);
                    return ExitCode::from(EXIT_LOOKUP);
                }
            }
        }
        GetFormat::Text => match value {
            serde_json::Value::String(s) => println!("{}", s),
            other => println!("{}", other),
        },
    }
    ExitCode::SUCCESS
}

fn cmd_sections(files: &[PathBuf], options: Options) -> ExitCode {
    match load_config(files, options) {
        Ok(config) => {
            for section in config.sections() {
                println!("{}", section);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.red());
            ExitCode::from(EXIT_LOAD)
        }
    }
}

fn cmd_options(files: &[PathBuf], options: Options, section: &str, own: bool) -> ExitCode {
    let config = match load_config(files, options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(EXIT_LOAD);
        }
    };

    let names = if own {
        if !config.has_section(section) {
            eprintln!("{}: {}", "Error".red(), inifold_core::Error::section_not_found(section));
            return ExitCode::from(EXIT_LOOKUP);
        }
        config.section_options(section)
    } else {
        match config.options(section) {
            Ok(names) => names,
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                return ExitCode::from(EXIT_LOOKUP);
            }
        }
    };

    for name in names {
        println!("{}", name);
    }
    ExitCode::SUCCESS
}

/// Rebuild a configuration holding already unfolded values
fn resolved_config(config: &Config) -> inifold_core::Result<Config> {
    let mut out = Config::with_options(*config.formatting());
    for (section, entries) in config.to_map(true)? {
        out.add_section(&section);
        for (option, value) in entries {
            out.add_entry(&section, option, value);
        }
    }
    Ok(out)
}

fn render_dump(
    config: &Config,
    resolve: bool,
    format: DumpFormat,
    header: Option<&str>,
) -> Result<String, String> {
    let map = || -> Result<IndexMap<String, IndexMap<String, String>>, String> {
        config.to_map(resolve).map_err(|e| e.to_string())
    };

    match format {
        DumpFormat::Ini if resolve => resolved_config(config)
            .map(|c| c.to_ini_string(header))
            .map_err(|e| e.to_string()),
        DumpFormat::Ini => Ok(config.to_ini_string(header)),
        DumpFormat::Json => serde_json::to_string_pretty(&map()?)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        DumpFormat::Yaml => serde_yaml::to_string(&map()?).map_err(|e| e.to_string()),
    }
}

fn cmd_dump(
    files: &[PathBuf],
    options: Options,
    resolve: bool,
    format: DumpFormat,
    header: Option<&str>,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(files, options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(EXIT_LOAD);
        }
    };

    let content = match render_dump(&config, resolve, format, header) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(EXIT_LOOKUP);
        }
    };

    if let Some(output_path) = output {
        if let Err(e) = std::fs::write(&output_path, &content) {
            eprintln!("{}: {}", "Error writing file".red(), e);
            return ExitCode::from(EXIT_LOAD);
        }
        eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
    } else {
        print!("{}", content);
    }
    ExitCode::SUCCESS
}

fn cmd_set(
    file: &Path,
    options: Options,
    section: &str,
    option: &str,
    value: &str,
    header: Option<&str>,
) -> ExitCode {
    let mut config = match load_or_new(file, options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(EXIT_LOAD);
        }
    };

    let fresh = config.add_entry(section, option, value);
    if let Err(e) = config.save(file, header) {
        eprintln!("{}: {}", "Error".red(), e);
        return ExitCode::from(EXIT_LOAD);
    }

    let verb = if fresh { "Added" } else { "Updated" };
    eprintln!("{} {} {}.{}", "✓".green(), verb, section, option);
    ExitCode::SUCCESS
}

fn cmd_unset(file: &Path, options: Options, section: &str, option: Option<&str>) -> ExitCode {
    let mut config = match Config::load_with_options(file, options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", format!("Failed to load {}: {}", file.display(), e).red());
            return ExitCode::from(EXIT_LOAD);
        }
    };

    let (removed, what) = match option {
        Some(option) => (
            config.remove_entry(section, option),
            format!("{}.{}", section, option),
        ),
        None => (config.remove_section(section), format!("[{}]", section)),
    };

    if !removed {
        eprintln!("{} Nothing removed: {}", "✗".red(), what);
        return ExitCode::from(EXIT_LOOKUP);
    }

    if let Err(e) = config.save(file, None) {
        eprintln!("{}: {}", "Error".red(), e);
        return ExitCode::from(EXIT_LOAD);
    }

    eprintln!("{} Removed {}", "✓".green(), what);
    ExitCode::SUCCESS
}

fn cmd_check(files: &[PathBuf], options: Options) -> ExitCode {
    let mut all_valid = true;

    for file in files {
        match Config::load_with_options(file, options) {
            Ok(config) => {
                println!(
                    "{} {}: valid INI ({} sections)",
                    "✓".green(),
                    file.display(),
                    config.sections().len()
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_LOOKUP)
    }
}
