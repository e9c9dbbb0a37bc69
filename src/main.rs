use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ftpdir::{Entry, EntryKind, Session, SessionConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    All,
    Files,
    Directories,
    Names,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    view: View,
    path: String,
}

fn main() -> Result<()> {
    init_tracing();

    let args = args_from_matches(&cli().get_matches());
    let config = SessionConfig::from_env()?;
    debug!("listing {} on {}", args.path, config.host);

    let session = Session::ftp(config);
    let listing = session.list_directory(&args.path)?;
    match args.view {
        View::All => listing.entries().iter().for_each(print_entry),
        View::Files => listing.files().into_iter().for_each(print_entry),
        View::Directories => listing.directories().into_iter().for_each(print_entry),
        View::Names => listing.names().into_iter().for_each(|name| println!("{name}")),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cli() -> clap::App<'static, 'static> {
    clap::App::new("ftpdir")
        .version(clap::crate_version!())
        .about("List a directory on an FTP server configured through FTPDIR_* variables")
        .arg(clap::Arg::from_usage("--files 'Only list files'"))
        .arg(clap::Arg::from_usage("--dirs 'Only list directories'"))
        .arg(clap::Arg::from_usage("--names 'Only print entry names'"))
        .group(clap::ArgGroup::with_name("view").args(&["files", "dirs", "names"]))
        .arg(clap::Arg::from_usage("[PATH] 'Remote directory, the root when omitted'"))
}

fn args_from_matches(matches: &clap::ArgMatches<'_>) -> CliArgs {
    let view = if matches.is_present("files") {
        View::Files
    } else if matches.is_present("dirs") {
        View::Directories
    } else if matches.is_present("names") {
        View::Names
    } else {
        View::All
    };
    CliArgs {
        view,
        path: matches.value_of("PATH").unwrap_or_default().to_string(),
    }
}

fn print_entry(entry: &Entry) {
    let marker = match entry.kind() {
        EntryKind::Directory => 'd',
        EntryKind::File => '-',
    };
    let timestamp = entry
        .timestamp()
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{marker} {:>12} {timestamp} {}",
        entry.formatted_size(),
        entry.canonical()
    );
}
