use crate::error::{EmbedError, Result};
use lofty::picture::{MimeType, Picture};
use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Flag value that asks for a remote lookup instead of a local file.
pub const AUTO: &str = "auto";

const FALLBACK_MIME: &str = "application/octet-stream";

/// Where cover art or lyrics come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Auto,
    File(PathBuf),
}

impl FromStr for Source {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s == AUTO {
            Source::Auto
        } else {
            Source::File(PathBuf::from(s))
        })
    }
}

/// Reads a local image and sniffs its MIME type from the leading bytes.
pub fn read_image(path: &Path) -> Result<(Vec<u8>, String)> {
    let data = fs::read(path).map_err(|e| EmbedError::file_open(path, e))?;
    let mime = sniff_mime(&data);
    Ok((data, mime))
}

pub fn read_lyrics(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| EmbedError::file_open(path, e))?;
    String::from_utf8(bytes).map_err(|e| EmbedError::decode("lyrics file", e))
}

fn sniff_mime(data: &[u8]) -> String {
    match Picture::from_reader(&mut &data[..]) {
        Ok(picture) => picture
            .mime_type()
            .map(MimeType::as_str)
            .unwrap_or(FALLBACK_MIME)
            .to_string(),
        Err(_) => FALLBACK_MIME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, b'I', b'H', b'D',
        b'R', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00,
    ];

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tagembed_source_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_auto_sentinel() {
        assert_eq!("auto".parse::<Source>().unwrap(), Source::Auto);
        assert_eq!(
            "Auto".parse::<Source>().unwrap(),
            Source::File(PathBuf::from("Auto"))
        );
        assert_eq!(
            "cover.jpg".parse::<Source>().unwrap(),
            Source::File(PathBuf::from("cover.jpg"))
        );
    }

    #[test]
    fn read_image_detects_png() {
        let dir = scratch_dir("png");
        let path = dir.join("cover.png");
        fs::write(&path, PNG_HEADER).unwrap();

        let (data, mime) = read_image(&path).unwrap();
        assert_eq!(data, PNG_HEADER);
        assert_eq!(mime, "image/png");
    }

    #[test]
    fn unknown_image_data_falls_back() {
        assert_eq!(sniff_mime(b"definitely not an image"), FALLBACK_MIME);
        assert_eq!(sniff_mime(b""), FALLBACK_MIME);
    }

    #[test]
    fn missing_files_are_file_open_errors() {
        let dir = scratch_dir("missing");
        let err = read_image(&dir.join("nope.jpg")).unwrap_err();
        assert!(matches!(err, EmbedError::FileOpen { .. }), "got {err:?}");
        let err = read_lyrics(&dir.join("nope.lrc")).unwrap_err();
        assert!(matches!(err, EmbedError::FileOpen { .. }), "got {err:?}");
    }

    #[test]
    fn read_lyrics_keeps_text_verbatim() {
        let dir = scratch_dir("lyrics");
        let path = dir.join("song.lrc");
        fs::write(&path, "[00:01.00]こんにちは\n").unwrap();
        assert_eq!(read_lyrics(&path).unwrap(), "[00:01.00]こんにちは\n");
    }
}
