// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! CLI tool for loading datasets into hash tables and inspecting them

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use hashfile::{
    ingest::Rows,
    Config, Entry, EntryId, HashFunction, Insertion, Method, Table, DEFAULT_CAPACITY,
};
use humansize::{SizeFormatter, BINARY};
use std::fs::File;
use std::io::BufReader;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};

macro_rules! die {
    ($fmt:literal, $($arg:tt)*) => {{
        eprintln!($fmt, $($arg)*);
        std::process::exit(1);
    }};

    ($msg:literal) => {{
        eprintln!($msg);
        std::process::exit(1);
    }};
}

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

pub fn init_tracing(quiet: bool, verbose: u8) -> (bool, LevelFilter) {
    let is_verbose = !quiet && verbose > 0;

    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Bridge log crate macros to tracing (the library logs through log::*)
    if tracing_log::LogTracer::init().is_err() {
        die!("INTERNAL ERROR: setting log tracer failed");
    }

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("HASHFILE_LOG")
        .from_env_lossy();

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact(),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        die!("INTERNAL ERROR: setting default tracing::subscriber failed");
    }

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing_panic::panic_hook(info);
        prev_hook(info); // daisy-chain to old panic hook
    }));

    (is_verbose, level_filter)
}

fn parse_range(s: &str) -> Result<Range<u32>, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {s:?}"))?;

    let start = start.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let end = end.trim().parse::<u32>().map_err(|e| e.to_string())?;

    if start > end {
        return Err(format!("empty range {start}..{end}"));
    }

    Ok(start..end)
}

/// CLI tool for disk-resident hash tables
#[derive(Parser, Debug)]
#[command(name = "hashfile")]
#[command(about = "CLI tool for disk-resident hash tables")]
struct ToolArgs {
    /// Suppress all output except for errors. This overrides the -v flag.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Turn on verbose output. Supply -v multiple times to increase verbosity.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: ToolCommand,
}

/// Table options that must match the ones the file was created with
#[derive(Args, Debug, Clone)]
struct TableArgs {
    /// Path to the table file
    table_path: PathBuf,

    /// Collision resolution method
    #[arg(short, long, default_value_t = Method::default())]
    method: Method,

    /// Hash function
    #[arg(long = "hash", default_value_t = HashFunction::default())]
    hash_function: HashFunction,

    /// Number of buckets
    #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
    capacity: u32,
}

impl TableArgs {
    fn open(&self) -> Table {
        match Config::new(&self.table_path)
            .capacity(self.capacity)
            .method(self.method)
            .hash_function(self.hash_function)
            .open()
        {
            Ok(table) => table,
            Err(e) => die!("Error opening table {}: {}", self.table_path.display(), e),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
enum ToolCommand {
    /// Load a CSV dataset into one table per method and hash function
    Bench {
        /// CSV dataset (line,address,id,birthdate,name,email,phone)
        dataset: PathBuf,

        /// Directory the table files are written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Only use this method (default: all)
        #[arg(short, long)]
        method: Option<Method>,

        /// Only use this hash function (default: all)
        #[arg(long = "hash")]
        hash_function: Option<HashFunction>,

        /// Number of buckets
        #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
        capacity: u32,

        /// Dataset lines to load, as START..END
        #[arg(short, long, value_parser = parse_range, default_value = "70000..80000")]
        rows: Range<u32>,

        /// Search every stored entry, then remove it and check it is gone
        #[arg(long)]
        verify: bool,
    },
    /// Print the entry with the given identifier
    Get {
        #[command(flatten)]
        table: TableArgs,

        /// Entry identifier
        id: EntryId,
    },
    /// Store an entry
    Put {
        #[command(flatten)]
        table: TableArgs,

        /// Entry identifier
        id: EntryId,

        /// Dataset line number
        #[arg(short, long, default_value_t = 0)]
        line: u32,

        /// Name
        #[arg(long, default_value = "")]
        name: String,

        /// Email address
        #[arg(long, default_value = "")]
        email: String,

        /// Phone number
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Remove the entry with the given identifier
    Del {
        #[command(flatten)]
        table: TableArgs,

        /// Entry identifier
        id: EntryId,
    },
    /// Show table statistics
    Info {
        #[command(flatten)]
        table: TableArgs,
    },
}

fn print_entry(entry: &Entry) {
    println!("Id: {}", entry.id);
    println!("Line: {}", entry.line);
    println!("Name: {}", entry.name);
    println!("Address: {}", entry.address);
    println!("Birthdate: {}", entry.birthdate);
    println!("Email: {}", entry.email);
    println!("Phone: {}", entry.phone);
}

fn print_info(table: &Table) {
    println!("Path: {}", table.path().display());
    println!("Method: {}", table.method());
    println!("Hash function: {}", table.hash_function());
    println!("Capacity: {}", table.capacity());

    match table.overflow_records() {
        Ok(n) => println!("Overflow records: {n}"),
        Err(e) => die!("Error: {}", e),
    }

    match table.disk_space() {
        Ok(bytes) => println!("Disk space: {}", SizeFormatter::new(bytes, BINARY)),
        Err(e) => die!("Error: {}", e),
    }
}

fn handle_get(table: &Table, id: EntryId) {
    match table.search(id) {
        Ok(Some(entry)) => print_entry(&entry),
        Ok(None) => println!("(not found)"),
        Err(e) => die!("Error: {}", e),
    }
}

fn handle_put(table: &mut Table, entry: &Entry) {
    match table.insert(entry) {
        Ok(Insertion::Inserted) => println!("OK"),
        Ok(Insertion::Collided) => println!("OK (collided)"),
        Ok(Insertion::Rejected) => println!("(rejected, bucket is occupied)"),
        Err(e) => die!("Error: {}", e),
    }
}

fn handle_del(table: &mut Table, id: EntryId) {
    match table.remove(id) {
        Ok(Some(_)) => println!("OK"),
        Ok(None) => println!("(not found)"),
        Err(e) => die!("Error: {}", e),
    }
}

/// Counters of one bench run
#[derive(Debug, Default)]
struct Report {
    rows: u64,
    collisions: u64,
    rejected: u64,
    missing: u64,
    leftover: u64,
}

fn load_dataset(path: &Path, rows: &Range<u32>) -> Vec<Entry> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => die!("Error opening dataset {}: {}", path.display(), e),
    };

    match Rows::new(BufReader::new(file), rows.clone()).collect::<Result<Vec<_>, _>>() {
        Ok(entries) => entries,
        Err(e) => die!("Error reading dataset {}: {}", path.display(), e),
    }
}

fn run_one(table: &mut Table, entries: &[Entry], verify: bool) -> hashfile::Result<Report> {
    let mut report = Report::default();
    let mut stored = Vec::with_capacity(entries.len());

    for entry in entries {
        report.rows += 1;

        let insertion = table.insert(entry)?;

        if insertion.collided() {
            report.collisions += 1;
        }

        if insertion.is_stored() {
            stored.push(entry.id);
        } else {
            report.rejected += 1;
        }
    }

    table.sync()?;

    if verify {
        for &id in &stored {
            if table.search(id)?.is_none() {
                warn!("Entry {id} was stored but is not found");
                report.missing += 1;
            }
        }

        for &id in &stored {
            table.remove(id)?;
        }

        for &id in &stored {
            if table.contains(id)? {
                warn!("Entry {id} is still found after removal");
                report.leftover += 1;
            }
        }
    }

    Ok(report)
}

fn handle_bench(
    dataset: &Path,
    out: &Path,
    methods: &[Method],
    hash_functions: &[HashFunction],
    capacity: u32,
    rows: &Range<u32>,
    verify: bool,
) {
    let entries = load_dataset(dataset, rows);
    info!("Loaded {} rows from {}", entries.len(), dataset.display());

    println!(
        "{:<16} {:<20} {:>8} {:>10} {:>8} {:>8} {:>12}",
        "method", "hash", "rows", "collisions", "rejected", "overflow", "disk space"
    );

    for &method in methods {
        for &hash_function in hash_functions {
            let path = out.join(format!("table_{method}_{hash_function}.bin"));

            let mut table = match Config::new(&path)
                .capacity(capacity)
                .method(method)
                .hash_function(hash_function)
                .truncate(true)
                .open()
            {
                Ok(table) => table,
                Err(e) => die!("Error creating table {}: {}", path.display(), e),
            };

            let start = Instant::now();

            let report = match run_one(&mut table, &entries, verify) {
                Ok(report) => report,
                Err(e) => die!("Error running {} with {}: {}", method, hash_function, e),
            };

            info!("{method} with {hash_function} took {:?}", start.elapsed());

            let (overflow, disk_space) = match (table.overflow_records(), table.disk_space()) {
                (Ok(overflow), Ok(disk_space)) => (overflow, disk_space),
                (Err(e), _) | (_, Err(e)) => die!("Error reading {}: {}", path.display(), e),
            };

            println!(
                "{:<16} {:<20} {:>8} {:>10} {:>8} {:>8} {:>12}",
                method.name(),
                hash_function.name(),
                report.rows,
                report.collisions,
                report.rejected,
                overflow,
                SizeFormatter::new(disk_space, BINARY).to_string(),
            );

            if verify {
                if report.missing > 0 || report.leftover > 0 {
                    error!(
                        "{method} with {hash_function}: {} missing, {} left over after removal",
                        report.missing, report.leftover,
                    );
                } else {
                    info!("{method} with {hash_function}: verified");
                }
            }
        }
    }
}

fn main() {
    let args = ToolArgs::parse();
    let (verbose, level_filter) = init_tracing(args.quiet, args.verbose);

    let cmd = ToolArgs::command();

    info!(
        "starting {} ({} {}), log level: {level_filter}",
        cmd.get_name(),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    if verbose {
        debug!("{:?}", args.command);
    }

    match args.command {
        ToolCommand::Bench {
            dataset,
            out,
            method,
            hash_function,
            capacity,
            rows,
            verify,
        } => {
            let methods = method.map_or_else(|| Method::ALL.to_vec(), |m| vec![m]);
            let hash_functions =
                hash_function.map_or_else(|| HashFunction::BUILTIN.to_vec(), |h| vec![h]);

            handle_bench(
                &dataset,
                &out,
                &methods,
                &hash_functions,
                capacity,
                &rows,
                verify,
            );
        }
        ToolCommand::Get { table, id } => handle_get(&table.open(), id),
        ToolCommand::Put {
            table,
            id,
            line,
            name,
            email,
            phone,
        } => {
            let entry = Entry::new(line, id).name(&name).email(&email).phone(&phone);
            handle_put(&mut table.open(), &entry);
        }
        ToolCommand::Del { table, id } => handle_del(&mut table.open(), id),
        ToolCommand::Info { table } => print_info(&table.open()),
    }
}
