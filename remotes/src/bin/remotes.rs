use clap::{ArgAction, Args, Parser, Subcommand};
use log::{Level, LevelFilter, Metadata, Record};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "remotes",
    version = env!("CARGO_PKG_VERSION"),
    about = "Infrared remote control decoding and encoding",
    subcommand_required = true
)]
struct App {
    /// Increase message verbosity
    #[arg(long, short, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    verbose: u8,

    /// Silence all warnings
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Receive(Receive),
    Transmit(Transmit),
    Decode(Decode),
    Keymap(KeymapCmd),
}

/// Decode infrared from a lirc device and print remote events
#[derive(Args)]
struct Receive {
    /// lirc device to read from
    #[arg(long = "device", short = 'd', default_value = "/dev/lirc0", help_heading = "DEVICE")]
    device: PathBuf,

    /// Codec to run; may be given multiple times, defaults to all
    #[arg(long = "codec", short = 'c', name = "CODEC")]
    codecs: Vec<String>,

    /// Resolve keycodes against the keymaps in this directory
    #[arg(long = "keymaps", short = 'k', name = "DIR")]
    keymaps: Option<PathBuf>,

    /// Ask the receiver to report after this much idle time, in microseconds
    #[arg(long = "timeout", short = 't', name = "TIMEOUT", help_heading = "DEVICE")]
    timeout: Option<u32>,
}

/// Encode a scancode and transmit it
#[derive(Args)]
struct Transmit {
    /// lirc device to transmit on
    #[arg(long = "device", short = 'd', default_value = "/dev/lirc0", help_heading = "DEVICE")]
    device: PathBuf,

    /// Codec to encode with
    #[arg(long = "codec", short = 'c', name = "CODEC")]
    codec: Option<String>,

    /// Device (address) field, decimal or 0x-prefixed hex
    #[arg(long = "address", short = 'a', name = "ADDRESS")]
    address: Option<String>,

    /// Scancode (command) field, decimal or 0x-prefixed hex
    #[arg(long = "scancode", short = 's', name = "SCANCODE")]
    scancode: Option<String>,

    /// Number of repeat frames to append
    #[arg(long = "repeats", short = 'r', name = "REPEATS")]
    repeats: Option<u32>,

    /// Transmit a key from this keymap file instead
    #[arg(long = "keymap", name = "KEYMAP", conflicts_with_all = ["CODEC", "ADDRESS", "SCANCODE"])]
    keymap: Option<PathBuf>,

    /// Keycode to look up in the keymap, e.g. KEY_POWER
    #[arg(long = "keycode", short = 'K', name = "KEYCODE", requires = "KEYMAP")]
    keycode: Option<String>,

    /// Transmit raw IR text, e.g. "+9000 -4500 +562"
    #[arg(long = "raw", name = "RAWIR", conflicts_with_all = ["CODEC", "KEYMAP"])]
    raw: Option<String>,

    /// Print the pulse array instead of transmitting
    #[arg(long = "dry-run", short = 'n')]
    dry_run: bool,
}

/// Run raw IR text through the protocol decoders
#[derive(Args)]
struct Decode {
    /// Codec to try; may be given multiple times, defaults to all
    #[arg(long = "codec", short = 'c', name = "CODEC")]
    codecs: Vec<String>,

    /// Raw IR text, e.g. "+9000 -4500 +562"
    #[arg(long = "raw", short = 'r', name = "RAWIR")]
    raw: Vec<String>,

    /// Read raw IR text from files
    #[arg(long = "file", short = 'f', name = "FILE")]
    files: Vec<PathBuf>,
}

/// Inspect keymap files
#[derive(Args)]
struct KeymapCmd {
    #[command(subcommand)]
    command: KeymapCommands,
}

#[derive(Subcommand)]
enum KeymapCommands {
    /// List keymaps and their keys
    List {
        /// Keymap file or directory of keymap files
        path: PathBuf,
    },
    /// Find the entries for a symbolic keycode
    Lookup {
        /// Keymap file or directory of keymap files
        path: PathBuf,
        /// Keycode to search for, e.g. KEY_POWER
        keycode: String,
    },
}

fn main() {
    let args = App::parse();

    log::set_logger(&CLI_LOGGER).unwrap();

    let level = if args.quiet {
        LevelFilter::Error
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    log::set_max_level(level);

    match &args.command {
        Commands::Receive(receive) => commands::receive::receive(receive),
        Commands::Transmit(transmit) => commands::transmit::transmit(transmit),
        Commands::Decode(decode) => commands::decode::decode(decode),
        Commands::Keymap(keymap) => commands::keymap::keymap(keymap),
    }
}

static CLI_LOGGER: CliLogger = CliLogger;

struct CliLogger;

impl log::Log for CliLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{}: {}",
                match record.level() {
                    Level::Trace => "trace",
                    Level::Debug => "debug",
                    Level::Info => "info",
                    Level::Warn => "warn",
                    Level::Error => "error",
                },
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
