//! Breadboard simulator command line.
//!
//! Opens (or starts) a circuit from the circuit directory and either drops
//! into the interactive console or, with `--headless`, runs it once and
//! prints which outputs are lit.

use clap::Parser;
use log::{debug, info, LevelFilter};
use std::path::PathBuf;
use std::process::ExitCode;

use rusty_breadboard::config::AppConfig;
use rusty_breadboard::console::run_console;
use rusty_breadboard::session::Workbench;
use rusty_breadboard::store::{CircuitId, JsonDirectoryStore};

#[derive(Parser)]
#[command(name = "rusty_breadboard")]
#[command(version)]
#[command(about = "Virtual breadboard for 14-pin DIP logic gates", long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding saved circuits (overrides the settings file)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Circuit to open, created empty if it was never saved
    #[arg(long, default_value = "untitled")]
    circuit: String,

    /// Run the circuit once and print the result instead of opening the console
    #[arg(long)]
    headless: bool,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn main(self) -> Result<(), Box<dyn std::error::Error>> {
        if self.verbose {
            env_logger::builder().filter_level(LevelFilter::Info).init();
            info!("Verbose output enabled (ignoring RUST_LOG environment variable)");
        } else {
            env_logger::init();
            debug!("Logging configured from environment variables");
        }

        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(dir) = self.store {
            config.store_dir = dir;
        }
        let store = JsonDirectoryStore::new(config.store_dir.clone());
        info!("Circuit directory: {}", store.root().display());
        let id = CircuitId::new(self.circuit);
        let mut workbench = Workbench::new(Box::new(store), config.simulation, id.clone());
        workbench.open_or_create(id)?;

        if self.headless {
            let report = workbench.with_circuit(|c| c.run());
            println!("{}: {}", workbench.active_id(), report.summary);
            for coord in &report.lit_outputs {
                println!("  lit {}", coord);
            }
            for conflict in &report.conflicts {
                println!(
                    "  conflict at {}: {} vs {}, resolved {}",
                    conflict.coordinate, conflict.values.0, conflict.values.1, conflict.resolved
                );
            }
            return Ok(());
        }

        run_console(workbench, config.console)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
