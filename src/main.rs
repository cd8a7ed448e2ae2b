use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simpledb::config::{Config, DEFAULT_DATABASE};
use simpledb::{QueryOutcome, QueryProcessor, ResultSet, Storage};

const PROMPT: &str = "simpledb> ";

const HELP: &str = "\
Supported commands:
  CREATE TABLE <name> <col>[ <type>], ...      types: INT, STRING, BOOL
  INSERT INTO <name> VALUES <value>, ...       values: 42, \"text\", true, false, word
  SELECT * FROM <name> [WHERE <col> = <value>]
  SELECT <col>, ... FROM <name> [WHERE <col> = <value>]
  HELP                                         show this message
  EXIT                                         save every table and quit";

/// Minimal embedded table store with a line-oriented command language
#[derive(clap::Parser, Debug)]
#[command(name = "simpledb", version, about, long_about = None)]
struct Args {
    /// Database name (a directory under the root)
    #[arg(short, long, default_value = DEFAULT_DATABASE, env = "SIMPLEDB_DATABASE")]
    database: String,

    /// Root directory holding databases [default: ~/.simpledb]
    #[arg(long, value_name = "DIR", env = "SIMPLEDB_ROOT")]
    root: Option<PathBuf>,

    /// Execute a single command and exit
    #[arg(short, long)]
    command: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::new(args.database);
    if let Some(root) = args.root {
        config = config.with_root(root);
    }
    info!(dir = %config.database_dir().display(), "opening database");

    let mut storage = Storage::open_with_config(&config)
        .with_context(|| format!("cannot open {}", config.database_dir().display()))?;

    match args.command {
        Some(command) => run_command(&mut storage, &command),
        None => run_repl(&mut storage),
    }
}

/// Executes one command and saves every table before returning.
fn run_command(storage: &mut Storage, command: &str) -> Result<()> {
    let outcome = QueryProcessor::new(storage).execute(command)?;
    print_outcome(&outcome);
    storage.persist_all().context("failed to save tables")?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "simpledb=debug" } else { "simpledb=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Runs the read loop, then saves every table however the loop ended.
fn run_repl(storage: &mut Storage) -> Result<()> {
    println!("SimpleDB - database {:?}", storage.database_name());
    println!("Type 'EXIT' to quit, 'HELP' for commands");

    let session = read_loop(storage, io::stdin().lock());
    storage.persist_all().context("failed to save tables")?;
    info!("all tables saved");
    session
}

fn read_loop(storage: &mut Storage, input: impl BufRead) -> Result<()> {
    let mut lines = input.lines();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        // End of input behaves like EXIT.
        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                eprintln!("Error: input is not valid UTF-8");
                continue;
            }
            Err(e) => return Err(e).context("failed to read input"),
        };
        let input = line.trim();

        match input {
            "" => continue,
            "EXIT" | "exit" => break,
            "HELP" | "help" => println!("{HELP}"),
            _ => match QueryProcessor::new(storage).execute(input) {
                Ok(outcome) => print_outcome(&outcome),
                Err(e) => eprintln!("Error: {e}"),
            },
        }
    }
    Ok(())
}

fn print_outcome(outcome: &QueryOutcome) {
    match outcome {
        QueryOutcome::Created { table, columns } => {
            println!("Table {table} created with columns: {}", columns.join(", "));
        }
        QueryOutcome::Inserted { table } => println!("Inserted 1 row into {table}"),
        QueryOutcome::Rows(result) => print_result_set(result),
    }
}

/// Prints rows as left-aligned columns sized to their widest cell.
fn print_result_set(result: &ResultSet) {
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |row: &[String]| {
        row.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", format_line(&result.columns));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &cells {
        println!("{}", format_line(row));
    }
    let count = cells.len();
    println!("({count} row{})", if count == 1 { "" } else { "s" });
}
