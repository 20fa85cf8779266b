use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::config::Config;
use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::resolver::Resolver;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox execution core: resolves and runs parsed programs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,

    /// Maximum nesting of Lox function calls
    #[arg(long, global = true, default_value_t = Config::DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolves a JSON-serialized program and prints each local's hop count
    Resolve { filename: Option<PathBuf> },

    /// Resolves and runs a JSON-serialized program
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Reports a core error the way the driver's exit-code contract expects.
fn fail(error: LoxError) -> ! {
    debug!("Exiting on error: {:?}", error);
    eprintln!("{}", error);
    std::process::exit(error.exit_code());
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let config = Config::default().with_max_call_depth(args.max_call_depth);

    match args.commands {
        Commands::Resolve { filename } => match filename {
            Some(filename) => {
                info!("Running Resolve subcommand");
                let buf = read_file(filename)?;
                let statements = rox::load_program(&buf).unwrap_or_else(|e| fail(e));

                let mut interpreter = Interpreter::with_config(config, Box::new(std::io::sink()));
                if let Err(e) = Resolver::new(&mut interpreter).resolve(&statements) {
                    fail(e.into());
                }

                let table: BTreeMap<u32, usize> = interpreter
                    .locals()
                    .iter()
                    .map(|(id, depth)| (id.0, *depth))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&table)?);

                info!("Resolve subcommand completed");
            }
            None => {
                info!("No filepath provided for Resolve");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let buf = read_file(filename)?;
                let statements = rox::load_program(&buf).unwrap_or_else(|e| fail(e));

                let mut interpreter = Interpreter::with_config(config, Box::new(std::io::stdout()));
                match rox::run(&mut interpreter, &statements) {
                    Ok(()) => info!("Program executed successfully"),
                    Err(e) => fail(e),
                }
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },
    }

    Ok(())
}
