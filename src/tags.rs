use crate::error::{EmbedError, Result};
use id3::frame::{Content, Lyrics, Picture, PictureType};
use id3::{Encoding, ErrorKind, Frame, Tag, TagLike, Version};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const COMMENT_ID: &str = "COMM";
pub const PICTURE_ID: &str = "APIC";
pub const LYRICS_ID: &str = "USLT";

pub const COVER_DESCRIPTION: &str = "Cover Art";
pub const LYRICS_DESCRIPTOR: &str = "Lyrics";

/// Encoding given to added frames that do not pick their own.
pub const DEFAULT_ENCODING: Encoding = Encoding::UTF16;

const SUMMARY_LIMIT: usize = 70;

/// Lookup key for the remote services; compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub artist: String,
    pub title: String,
}

impl TrackQuery {
    pub fn search_term(&self) -> String {
        format!("{} {}", self.artist, self.title)
    }
}

impl fmt::Display for TrackQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// One line of the preview listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    pub id: String,
    pub kind: &'static str,
    pub text: String,
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.id, self.text, self.kind)
    }
}

/// Whether the session ended by writing the file or by dropping the edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    Discarded,
}

/// The tag of a single file, held from open until `finish`.
pub struct TagSession {
    path: PathBuf,
    tag: Tag,
    default_encoding: Option<Encoding>,
}

impl TagSession {
    /// Reads the ID3 tag of `path`. A file without a tag opens as an empty one.
    pub fn open(path: &Path) -> Result<Self> {
        let tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
                debug!(path = %path.display(), "no ID3 tag, starting empty");
                Tag::new()
            }
            Err(e) => return Err(EmbedError::file_open(path, e)),
        };

        Ok(Self {
            path: path.to_path_buf(),
            tag,
            default_encoding: None,
        })
    }

    pub fn track_query(&self) -> TrackQuery {
        TrackQuery {
            artist: self.tag.artist().unwrap_or("").to_string(),
            title: self.tag.title().unwrap_or("").to_string(),
        }
    }

    /// All frames sorted by frame ID; equal IDs keep their tag order.
    pub fn frame_summaries(&self) -> Vec<FrameSummary> {
        let mut frames: Vec<&Frame> = self.tag.frames().collect();
        frames.sort_by(|a, b| a.id().cmp(b.id()));
        frames.into_iter().map(summarize).collect()
    }

    pub fn set_default_encoding(&mut self, encoding: Encoding) {
        self.default_encoding = Some(encoding);
    }

    /// Adds `frame`, applying the default encoding if it has none of its own.
    pub fn add(&mut self, frame: Frame) {
        let frame = match (frame.encoding(), self.default_encoding) {
            (None, Some(default)) => frame.set_encoding(Some(default)),
            _ => frame,
        };
        debug!(id = frame.id(), encoding = ?frame.encoding(), "adding frame");
        if let Some(replaced) = self.tag.add_frame(frame) {
            debug!(id = replaced.id(), "replaced existing frame");
        }
    }

    /// Rewrites the first comment as Latin-1, dropping any others.
    ///
    /// Some tag readers choke on comments written in mixed encodings. Text
    /// outside Latin-1 cannot be rewritten without loss and fails the run.
    pub fn normalize_comment(&mut self) -> Result<bool> {
        let first = self.tag.frames().find_map(|f| match f.content() {
            Content::Comment(c) if f.id() == COMMENT_ID => Some(c.clone()),
            _ => None,
        });

        let Some(comment) = first else {
            return Ok(false);
        };

        if !is_latin1(&comment.description) || !is_latin1(&comment.text) {
            return Err(EmbedError::file_write(
                &self.path,
                "comment contains characters outside Latin-1",
            ));
        }

        self.tag.remove(COMMENT_ID);
        self.add(
            Frame::with_content(COMMENT_ID, Content::Comment(comment))
                .set_encoding(Some(Encoding::Latin1)),
        );
        Ok(true)
    }

    /// Replaces every attached picture with a single front cover.
    pub fn replace_cover(&mut self, data: Vec<u8>, mime_type: &str) {
        self.tag.remove(PICTURE_ID);
        let picture = Picture {
            mime_type: mime_type.to_string(),
            picture_type: PictureType::CoverFront,
            description: COVER_DESCRIPTION.to_string(),
            data,
        };
        self.add(
            Frame::with_content(PICTURE_ID, Content::Picture(picture))
                .set_encoding(Some(Encoding::Latin1)),
        );
    }

    /// Replaces every unsynchronised lyrics frame with one in `lang`.
    pub fn replace_lyrics(&mut self, text: &str, lang: &str) {
        self.tag.remove(LYRICS_ID);
        let lyrics = Lyrics {
            lang: lang.to_string(),
            description: LYRICS_DESCRIPTOR.to_string(),
            text: text.to_string(),
        };
        self.add(
            Frame::with_content(LYRICS_ID, Content::Lyrics(lyrics))
                .set_encoding(Some(Encoding::UTF8)),
        );
    }

    /// Writes the tag back exactly once, or drops every edit in preview mode.
    pub fn finish(self, preview: bool) -> Result<Outcome> {
        if preview {
            debug!(path = %self.path.display(), "preview, discarding edits");
            return Ok(Outcome::Discarded);
        }

        self.tag
            .write_to_path(&self.path, Version::Id3v24)
            .map_err(|e| EmbedError::file_write(&self.path, e))?;
        info!(path = %self.path.display(), "tag saved");
        Ok(Outcome::Saved)
    }
}

fn summarize(frame: &Frame) -> FrameSummary {
    let (kind, text) = match frame.content() {
        Content::Text(s) => ("TextFrame", s.clone()),
        Content::ExtendedText(t) => ("UserDefinedTextFrame", t.value.clone()),
        Content::Link(l) => ("LinkFrame", l.clone()),
        Content::Comment(c) => ("CommentFrame", c.text.clone()),
        Content::Lyrics(l) => ("UnsynchronisedLyricsFrame", l.text.clone()),
        Content::Picture(p) => ("PictureFrame", p.description.clone()),
        other => ("UnknownFrame", format!("{:?}", other)),
    };

    FrameSummary {
        id: frame.id().to_string(),
        kind,
        text: truncate(&text, SUMMARY_LIMIT),
    }
}

fn is_latin1(s: &str) -> bool {
    s.chars().all(|c| c <= '\u{ff}')
}

/// Cuts `s` to `limit` characters, marking the cut with `...`.
pub fn truncate(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
