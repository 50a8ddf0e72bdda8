use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::task::JoinSet;

use vin_scan::{Command, Config, PrefillTracker, Prefiller};

#[derive(Parser, Debug)]
#[command(
    name = "vin-scan",
    version,
    about = "Extract VINs from OCR text and decode manufacturer details"
)]
struct Cli {
    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings", global = true)]
    read_settings: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode group, make, segments and plant from a (partial) VIN
    Decode { vin: String },
    /// Report whether a VIN is valid and whether it has I/O/Q characters
    Check { vin: String },
    /// Pick the best VIN from OCR text (stdin by default) or an image
    Extract {
        /// Image to OCR with tesseract
        #[arg(long, conflicts_with = "text_file")]
        image: Option<String>,

        /// File holding OCR text
        #[arg(long = "text-file")]
        text_file: Option<String>,

        /// List every scored 17-character candidate instead
        #[arg(long, conflicts_with = "image")]
        candidates: bool,
    },
    /// Look up make and model, falling back to the local guess
    Prefill { vin: String },
    /// Decode VINs as they are typed, prefilling make/model in the background
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    vin_scan::logging::init(cli.verbose)?;

    let command = match cli.command {
        Commands::Decode { vin } => Command::Decode { vin },
        Commands::Check { vin } => Command::Check { vin },
        Commands::Prefill { vin } => Command::Prefill { vin },
        Commands::Extract {
            image,
            text_file,
            candidates,
        } => {
            let text = if image.is_some() {
                None
            } else {
                Some(read_ocr_text(text_file.as_deref())?)
            };
            Command::Extract {
                image,
                text,
                candidates,
            }
        }
        Commands::Interactive => {
            return run_interactive(cli.read_settings.as_deref()).await;
        }
    };

    let output = vin_scan::run(Config {
        command,
        json: cli.json,
        settings_path: cli.read_settings,
    })
    .await?;
    println!("{}", output);
    Ok(())
}

fn read_ocr_text(path: Option<&str>) -> Result<String> {
    if let Some(path) = path {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read OCR text: {}", path));
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .with_context(|| "stdin must be UTF-8 OCR text")?;
    Ok(buffer)
}

async fn run_interactive(settings_path: Option<&str>) -> Result<()> {
    let settings = vin_scan::settings::load_settings(settings_path.map(Path::new))?;
    let prefiller = Arc::new(Prefiller::new(&settings.prefill));
    let tracker = Arc::new(PrefillTracker::new());
    let mut lookups = JoinSet::new();

    println!("Interactive mode. Type a VIN, or /quit to finish.");
    let mut line = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    loop {
        line.clear();
        print!("> ");
        io::stdout().flush()?;
        if stdin_lock.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "/quit" | "/exit") {
            break;
        }

        let info = vin_scan::decode_vin_info(input);
        println!(
            "{}",
            vin_scan::format_decoded(&info, vin_scan::has_vin_ambiguous_chars(input))
        );

        let prefiller = prefiller.clone();
        let tracker = tracker.clone();
        let vin = input.to_string();
        lookups.spawn(async move {
            if let Some(result) = prefiller.prefill_tracked(&tracker, &vin).await {
                println!("\n{}", vin_scan::format_make_model(&result));
            }
        });
        while lookups.try_join_next().is_some() {}
    }

    // Lookups still in flight at EOF or /quit get to print before exit.
    while let Some(joined) = lookups.join_next().await {
        if let Err(err) = joined {
            tracing::warn!("prefill task failed: {}", err);
        }
    }
    Ok(())
}
