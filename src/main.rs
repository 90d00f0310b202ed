mod artwork;
mod embed;
mod error;
mod http;
mod lyrics;
mod source;
mod tags;

use anyhow::Result;
use artwork::DEFAULT_ARTWORK_API;
use clap::Parser;
use colored::Colorize;
use embed::Options;
use http::HttpTransport;
use lyrics::DEFAULT_LYRICS_API;
use source::Source;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "tagembed",
    version,
    about = "Embed cover art and lyrics into an MP3's ID3v2 tag"
)]
struct Cli {
    /// MP3 file to edit
    file: PathBuf,

    /// Path to image file to embed, or 'auto' to fetch cover art
    #[arg(long, value_name = "PATH|auto")]
    image: Option<Source>,

    /// Path to lyrics file to embed, or 'auto' to fetch synced lyrics
    #[arg(long, value_name = "PATH|auto")]
    lyrics: Option<Source>,

    /// Language code for embedded frames (e.g. jpn, eng)
    #[arg(long, default_value = "jpn", value_parser = parse_lang)]
    lang: String,

    /// Show what would change without modifying the file
    #[arg(long, visible_alias = "dryrun")]
    dry_run: bool,

    /// Print debug diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, hide = true, env = "TAGEMBED_LYRICS_API", default_value = DEFAULT_LYRICS_API)]
    lyrics_api: String,

    #[arg(long, hide = true, env = "TAGEMBED_ARTWORK_API", default_value = DEFAULT_ARTWORK_API)]
    artwork_api: String,
}

impl From<Cli> for Options {
    fn from(cli: Cli) -> Self {
        Options {
            file: cli.file,
            image: cli.image,
            lyrics: cli.lyrics,
            lang: cli.lang,
            preview: cli.dry_run,
            lyrics_api: cli.lyrics_api,
            artwork_api: cli.artwork_api,
        }
    }
}

/// ID3 language fields are exactly three ASCII letters.
fn parse_lang(s: &str) -> std::result::Result<String, String> {
    if s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(s.to_string())
    } else {
        Err(format!("expected a three-letter language code, got '{}'", s))
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.dry_run {
        println!(
            "tagembed v{} -- {}\n",
            env!("CARGO_PKG_VERSION"),
            "DRY RUN (file will not be modified)".bold()
        );
    }

    let transport = HttpTransport::new()?;
    let opts = Options::from(cli);
    let mut stdout = std::io::stdout().lock();
    embed::run(&opts, &transport, &mut stdout)?;

    Ok(())
}
