//! Songbook CLI: terminal front end for the song list

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use songbook::data::{FileStore, Settings};
use songbook::{AppError, IdStrategy, SongCommand, SongSession, SongStore};

#[derive(Parser)]
#[command(name = "songbook", about = "Keep a list of songs to learn", version)]
struct Cli {
    /// Directory holding the stored list (defaults to the user data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the home screen
    Home,
    /// Show the song list
    List,
    /// Add a song
    Add {
        /// Song title
        title: String,
    },
    /// Change a song's title
    Edit {
        /// Song id
        id: String,
        /// New title
        title: String,
    },
    /// Remove a song
    Remove {
        /// Song id
        id: String,
    },
    /// Check or uncheck a song
    Toggle {
        /// Song id
        id: String,
    },
    /// Show a single song
    Show {
        /// Song id
        id: String,
    },
    /// Show contact details
    Contact,
    /// Change preferences
    Config {
        /// Name used in the list greeting (empty clears it)
        #[arg(long)]
        name: Option<String>,
        /// How new songs get their id: title or sequential
        #[arg(long)]
        id_strategy: Option<IdStrategy>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn open_store(data_dir: Option<PathBuf>) -> songbook::Result<FileStore> {
    match data_dir {
        Some(dir) => Ok(FileStore::new(dir)),
        None => FileStore::open_default(),
    }
}

fn print_home() {
    println!("Home");
    println!();
    println!("  songbook list      Songs");
    println!("  songbook contact   Contact Us");
}

fn print_contact() {
    println!("Contact Us");
}

fn print_list(settings: &Settings, songs: &SongStore) {
    println!("{}", settings.greeting());
    println!();

    if songs.is_empty() {
        println!("No songs added yet.");
        println!("Add a song to get started.");
        return;
    }

    for (i, song) in songs.snapshot().iter().enumerate() {
        let mark = if song.completed { "x" } else { " " };
        if song.id == song.title {
            println!("{:>3}. [{}] {}", i + 1, mark, song.title);
        } else {
            println!("{:>3}. [{}] {}  (id: {})", i + 1, mark, song.title, song.id);
        }
    }
    println!();
    println!("{} of {} done", songs.completed_count(), songs.len());
}

fn print_detail(session: &SongSession<FileStore>, id: &str) {
    let detail = session.detail(id);
    println!("ID: {}", detail.id);
    match detail.song {
        Some(song) => {
            println!("Title: {}", song.title);
            println!("Completed: {}", if song.completed { "yes" } else { "no" });
        }
        None => println!("(not in the list)"),
    }
}

/// Apply one mutation, then show the list
fn run_mutation(
    mut session: SongSession<FileStore>,
    settings: &Settings,
    cmd: SongCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match session.apply(cmd) {
        Ok(()) => {}
        Err(AppError::Rejected(reason)) => {
            // Nothing was changed; the user can retry with corrected input
            eprintln!("{}", reason);
            session.close();
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    print_list(settings, session.songs());

    session.flush();
    if session.failed_saves() > 0 {
        eprintln!("Warning: changes could not be saved");
    }
    session.close();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = open_store(cli.data_dir)?;
    let mut settings = Settings::load_or_default(&store);

    match cli.command.unwrap_or(Command::List) {
        Command::Home => print_home(),
        Command::Contact => print_contact(),
        Command::Config { name, id_strategy } => {
            if let Some(name) = name {
                settings.display_name = Some(name).filter(|n| !n.trim().is_empty());
            }
            if let Some(strategy) = id_strategy {
                settings.id_strategy = strategy;
            }
            settings.save(&store)?;
            println!("{}", settings.greeting());
            println!("New songs use {} ids", settings.id_strategy.display_name());
        }
        Command::List => {
            let session = SongSession::open(store)?;
            print_list(&settings, session.songs());
            session.close();
        }
        Command::Show { id } => {
            let session = SongSession::open(store)?;
            print_detail(&session, &id);
            session.close();
        }
        Command::Add { title } => {
            run_mutation(SongSession::open(store)?, &settings, SongCommand::Add(title))?;
        }
        Command::Edit { id, title } => {
            run_mutation(SongSession::open(store)?, &settings, SongCommand::Edit { id, title })?;
        }
        Command::Remove { id } => {
            run_mutation(SongSession::open(store)?, &settings, SongCommand::Remove(id))?;
        }
        Command::Toggle { id } => {
            run_mutation(
                SongSession::open(store)?,
                &settings,
                SongCommand::ToggleCompleted(id),
            )?;
        }
    }

    Ok(())
}
