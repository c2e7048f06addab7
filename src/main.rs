/*!
 * Meshlink CLI - inspect and drive a running meshing application
 */

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use meshlink::{
    config::{ClientConfig, LogLevel},
    error::{MeshlinkError, EXIT_FAILURE, EXIT_SUCCESS},
    logging,
    system::MockDatamodel,
    CallArgs, ErrorPolicy, Menu, Path, Session, Subsystem, TuiCommand,
};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "meshlink")]
#[command(version, about = "Browse and drive a meshing application's command and settings trees", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Server address, overrides the configuration file
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// Which tree to address
    #[arg(long, value_enum, default_value = "tui", global = true)]
    subsystem: SubsystemArg,

    /// Fail on transport errors instead of returning empty results
    #[arg(long, global = true)]
    propagate_errors: bool,

    /// Use a built-in demo tree instead of a server
    #[arg(long, global = true)]
    mock: bool,

    /// Log level
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Write logs to this file (JSON)
    #[arg(long = "log", value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the children of a menu
    Children {
        /// Wire path, e.g. /file
        #[arg(default_value = "")]
        path: String,

        /// Include children unavailable in the current state
        #[arg(long)]
        all: bool,
    },

    /// Show the help string of a node
    Doc {
        #[arg(default_value = "")]
        path: String,
    },

    /// Print the state held at a path
    Get { path: String },

    /// Replace the state held at a path
    Set {
        path: String,

        /// New state as JSON
        value: String,
    },

    /// Run a command or query
    Exec {
        path: String,

        /// Positional arguments (JSON, or plain strings)
        args: Vec<String>,

        /// Keyword argument as key=value (JSON, or plain string)
        #[arg(long = "kw", value_name = "KEY=VALUE")]
        keywords: Vec<String>,
    },

    /// List the object names held by a container
    Objects { path: String },

    /// Delete a named object
    Delete { path: String },

    /// Describe a subtree as {help, menus, commands}
    Discover {
        #[arg(default_value = "")]
        path: String,

        /// Write the description to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SubsystemArg {
    Tui,
    Settings,
}

impl From<SubsystemArg> for Subsystem {
    fn from(arg: SubsystemArg) -> Self {
        match arg {
            SubsystemArg::Tui => Subsystem::Tui,
            SubsystemArg::Settings => Subsystem::Settings,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            e.downcast_ref::<MeshlinkError>()
                .map(MeshlinkError::exit_code)
                .unwrap_or(EXIT_FAILURE)
        }
    };
    std::process::exit(code);
}

#[tokio::main]
async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => ClientConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };

    // Command line overrides the file
    if let Some(endpoint) = cli.endpoint.clone() {
        config.endpoint = endpoint;
    }
    if cli.propagate_errors {
        config.error_policy = ErrorPolicy::Propagate;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    config.verbose |= cli.verbose;

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let session = if cli.mock {
        Session::from_stubs(
            Arc::new(MockDatamodel::demo(Subsystem::Tui)),
            Arc::new(MockDatamodel::demo(Subsystem::Settings)),
            config.error_policy,
        )
    } else {
        meshlink::connect(&config)
            .await
            .with_context(|| format!("connecting to {}", config.endpoint))?
    };

    let subsystem: Subsystem = cli.subsystem.into();
    let tables = Arc::new(config.name_tables());
    let dialect = meshlink::menu::dialect_of(subsystem);
    let menu_at = |wire: &str| {
        Menu::with_tables(
            Arc::clone(session.service(subsystem)),
            Path::parse(wire, dialect, &tables),
            Arc::clone(&tables),
        )
    };

    match cli.command {
        Commands::Children { path, all } => {
            for name in menu_at(&path).get_child_names(all).await? {
                println!("{}", name);
            }
        }
        Commands::Doc { path } => {
            println!("{}", menu_at(&path).get_doc_string(false).await?);
        }
        Commands::Get { path } => {
            print_json(&menu_at(&path).get_state().await?)?;
        }
        Commands::Set { path, value } => {
            let value: Value = serde_json::from_str(&value)
                .with_context(|| format!("state for {} is not valid JSON", path))?;
            menu_at(&path).set_state(&value).await?;
        }
        Commands::Exec {
            path,
            args,
            keywords,
        } => {
            let menu = menu_at(&path);
            let positional = args.iter().map(|arg| parse_value(arg)).collect();
            let keywords = parse_keywords(&keywords)?;
            let call_args = CallArgs::from_parts(menu.path(), positional, keywords)?;

            let result = match subsystem {
                Subsystem::Tui => TuiCommand::from_menu(menu)
                    .execute(call_args)
                    .await?
                    .wait()
                    .await?,
                Subsystem::Settings => menu.execute(&call_args).await?,
            };
            print_json(&result)?;
        }
        Commands::Objects { path } => {
            for name in menu_at(&path).get_child_object_names().await? {
                println!("{}", name);
            }
        }
        Commands::Delete { path } => {
            menu_at(&path).del_item().await?;
        }
        Commands::Discover { path, out } => {
            let info = menu_at(&path).get_static_info().await?;
            let rendered = serde_json::to_string_pretty(&info)?;
            match out {
                Some(file) => std::fs::write(&file, rendered)
                    .with_context(|| format!("writing {}", file.display()))?,
                None => println!("{}", rendered),
            }
        }
    }

    Ok(())
}

/// JSON if it parses, the raw string otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_keywords(raw: &[String]) -> Result<Map<String, Value>> {
    raw.iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("keyword argument '{}' is not KEY=VALUE", pair))?;
            Ok((key.to_string(), parse_value(value)))
        })
        .collect()
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
