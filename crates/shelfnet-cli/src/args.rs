//! Command-line parsing.

use std::path::PathBuf;

/// Options shared by the commands that load books.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub batches: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub skip_failed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Build(Options),
    Genres(Options),
    Help,
}

/// Parse `args` (without the program name).
pub fn parse(args: &[String]) -> Result<Command, String> {
    let Some(command) = args.first() else {
        return Ok(Command::Build(Options::default()));
    };

    match command.as_str() {
        "build" => parse_options(&args[1..]).map(Command::Build),
        "genres" => parse_options(&args[1..]).map(Command::Genres),
        "--help" | "-h" | "help" => Ok(Command::Help),
        flag if flag.starts_with("--") => parse_options(args).map(Command::Build),
        other => Err(format!(
            "Unknown command: {}. Use 'shelfnet help' for usage.",
            other
        )),
    }
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => options.config = Some(value(&mut iter, arg)?),
            "--batches" => options.batches = Some(value(&mut iter, arg)?),
            "--output" | "-o" => options.output = Some(value(&mut iter, arg)?),
            "--skip-failed" => options.skip_failed = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
    }
    Ok(options)
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<PathBuf, String> {
    iter.next()
        .map(PathBuf::from)
        .ok_or_else(|| format!("{} needs a value", flag))
}

pub fn print_help() {
    println!("shelfnet — genre co-occurrence networks over book shelves");
    println!();
    println!("Usage: shelfnet [command] [options]");
    println!();
    println!("Commands:");
    println!("  build (default)          Build graphs and write animation frames");
    println!("  genres                   Print genre frequencies per batch");
    println!("  help                     Show this help message");
    println!();
    println!("Options:");
    println!("  --config <file>          JSON config (policy, untracked genres, paths)");
    println!("  --batches <dir>          One books file per period instead of books.json");
    println!("  --output, -o <file>      Where to write the animation JSON");
    println!("  --skip-failed            Leave out batches that fail instead of aborting");
    println!();
    println!("Environment: SHELFNET_DATA_DIR, SHELFNET_POLICY, SHELFNET_REQUIRED_WEIGHT,");
    println!("             SHELFNET_BASE_YEAR, RUST_LOG");
}
