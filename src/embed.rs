use crate::artwork;
use crate::http::Transport;
use crate::lyrics;
use crate::source::{self, Source};
use crate::tags::{Outcome, TagSession, DEFAULT_ENCODING};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Everything one run needs, already parsed from the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub file: PathBuf,
    pub image: Option<Source>,
    pub lyrics: Option<Source>,
    pub lang: String,
    pub preview: bool,
    pub lyrics_api: String,
    pub artwork_api: String,
}

/// Applies the requested edits to `opts.file` and saves them, unless previewing.
///
/// Nothing is written until every step has succeeded.
pub fn run(opts: &Options, transport: &dyn Transport, out: &mut dyn Write) -> Result<Outcome> {
    let mut session = TagSession::open(&opts.file)
        .with_context(|| format!("Error opening MP3 file {}", opts.file.display()))?;
    let query = session.track_query();
    debug!(%query, "opened tag");

    if opts.preview {
        for summary in session.frame_summaries() {
            writeln!(out, "{}", summary)?;
        }
    }

    session.set_default_encoding(DEFAULT_ENCODING);

    if session
        .normalize_comment()
        .context("Error normalizing comment frame")?
    {
        debug!("comment frame rewritten as Latin-1");
    }

    match &opts.image {
        None => {}
        Some(Source::Auto) => {
            let url = artwork::search_url(&opts.artwork_api, &query)?;
            if opts.preview {
                writeln!(out)?;
                writeln!(out, "{} {}", "Cover art URL:".bold(), url)?;
            } else {
                let art = artwork::fetch_cover_art(transport, url.as_str())
                    .context("Error fetching album art image")?;
                session.replace_cover(art.data, &art.mime_type);
            }
        }
        Some(Source::File(path)) => {
            if opts.preview {
                writeln!(out)?;
                writeln!(out, "{} {}", "Cover art from file:".bold(), path.display())?;
            } else {
                let (data, mime) =
                    source::read_image(path).context("Error reading album art image")?;
                session.replace_cover(data, &mime);
            }
        }
    }

    match &opts.lyrics {
        None => {}
        Some(Source::Auto) => {
            let text = lyrics::fetch_lyrics(transport, &opts.lyrics_api, &query)
                .context("Error fetching lyrics")?;
            if opts.preview {
                writeln!(out)?;
                writeln!(out, "{}", text)?;
            } else {
                session.replace_lyrics(&text, &opts.lang);
            }
        }
        Some(Source::File(path)) => {
            if opts.preview {
                writeln!(out)?;
                writeln!(out, "{} {}", "Lyrics text from file:".bold(), path.display())?;
            } else {
                let text = source::read_lyrics(path).context("Error reading lyrics file")?;
                session.replace_lyrics(&text, &opts.lang);
            }
        }
    }

    let outcome = session
        .finish(opts.preview)
        .context("Error saving MP3 file")?;
    if outcome == Outcome::Saved {
        writeln!(
            out,
            "{} {}",
            "Embedded successfully in".green(),
            opts.file.display()
        )?;
    }
    Ok(outcome)
}
