mod locations;
mod log;

use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use virus_hunt::{Console, GameConfig, GameStatus, Mode};

// Allow the game to return its version with a --version flag
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
struct Opts {
    #[clap(short, long)]
    version: bool,
    #[clap(short, long)]
    debug: bool,
    #[clap(short, long)]
    username: Option<String>,
    #[clap(short, long)]
    tutorial: bool,
    #[clap(short, long)]
    seed: Option<u64>,
    #[clap(short, long)]
    config: Option<PathBuf>,
}

fn load_config(opts: &Opts) -> Result<GameConfig, virus_hunt::config::ConfigError> {
    let mut config = match &opts.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(username) = &opts.username {
        config.username = username.clone();
    }
    if opts.seed.is_some() {
        config.seed = opts.seed;
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    let opts: Opts = Opts::parse();
    if opts.version {
        println!("{}", VERSION);
        return;
    }
    let _guard = match log::init_logging(opts.debug) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            None
        }
    };
    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    let mode = if opts.tutorial {
        Mode::Tutorial
    } else {
        Mode::Play
    };
    let mut console = match Console::new(config, mode) {
        Ok(console) => console,
        Err(e) => {
            eprintln!("Failed to build the world: {}", e);
            std::process::exit(1);
        }
    };
    play(&mut console);
}

fn play(console: &mut Console) {
    println!("Something is eating your files. Find the virus files and delete them in order.");
    println!("Type `help` to see what you can do.");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last_action = Instant::now();
    loop {
        print!("{} $ ", console.fs().path_of(console.current_dir()));
        let _ = std::io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };

        // The virus acts once for every full interval that passed while the
        // player was thinking.
        let interval = Duration::from_secs_f64(console.save().speed());
        while last_action.elapsed() >= interval {
            last_action += interval;
            if let Some(notice) = console.tick() {
                println!("{}", notice);
            }
        }

        let line = line.trim();
        if line == "exit" || line == "quit" {
            break;
        }
        if let Some(output) = console.execute(line) {
            println!("{}", output);
        }

        match console.status() {
            GameStatus::Playing => (),
            GameStatus::Won => {
                println!("All virus files removed. You win!");
                break;
            }
            GameStatus::Lost => {
                println!("Every file is gone. The virus wins.");
                break;
            }
        }
    }
    tracing::info!(
        virus_removed = console.save().virus_removed(),
        files_destroyed = console.save().files_destroyed(),
        "Game over"
    );
}
