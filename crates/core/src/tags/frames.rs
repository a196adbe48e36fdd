//! Mapping of vendor comment keys onto ID3v2 frames.

use lofty::id3::v2::{CommentFrame, ExtendedTextFrame, Frame, FrameId, TextInformationFrame};
use lofty::TextEncoding;

use super::error::TagWriteError;

/// Frame kind for a key with a dedicated ID3v2 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// A text information frame (`T***`).
    Text(&'static str),
    /// A comment frame (`COMM`).
    Comment,
}

impl FrameKind {
    /// The four-character frame identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Text(id) => id,
            Self::Comment => "COMM",
        }
    }
}

/// Where a normalized tag ends up in the ID3v2 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMapping<'a> {
    /// The key has a dedicated frame.
    Mapped(FrameKind),
    /// The key goes into a user-defined text frame (`TXXX`) described by
    /// the source comment key.
    Generic { description: &'a str },
}

const FRAME_TABLE: &[(&str, FrameKind)] = &[
    ("title", FrameKind::Text("TIT2")),
    ("album", FrameKind::Text("TALB")),
    ("artist", FrameKind::Text("TPE1")),
    ("albumartist", FrameKind::Text("TPE2")),
    ("album artist", FrameKind::Text("TPE2")),
    ("conductor", FrameKind::Text("TPE3")),
    ("remixer", FrameKind::Text("TPE4")),
    ("composer", FrameKind::Text("TCOM")),
    ("tracknumber", FrameKind::Text("TRCK")),
    ("discnumber", FrameKind::Text("TPOS")),
    ("date", FrameKind::Text("TDRC")),
    ("comment", FrameKind::Comment),
    ("genre", FrameKind::Text("TCON")),
    ("language", FrameKind::Text("TLAN")),
    ("key", FrameKind::Text("TKEY")),
    ("bpm", FrameKind::Text("TBPM")),
    ("publisher", FrameKind::Text("TPUB")),
    ("label", FrameKind::Text("TPUB")),
    ("isrc", FrameKind::Text("TSRC")),
];

/// Language code written into comment frames when none is known.
const UNKNOWN_LANGUAGE: [u8; 3] = *b"XXX";

/// ID3v2.4 separates the values of a multi-valued text frame with NUL.
const VALUE_SEPARATOR: &str = "\0";

/// Looks up the frame a normalized tag key translates to.
pub fn frame_mapping(key: &str) -> FrameMapping<'_> {
    FRAME_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| FrameMapping::Mapped(*kind))
        .unwrap_or(FrameMapping::Generic { description: key })
}

/// Builds the ID3v2 frame carrying `values` for tag `key`.
pub fn build_frame(key: &str, values: &[String]) -> Result<Frame<'static>, TagWriteError> {
    let content = values.join(VALUE_SEPARATOR);

    let frame = match frame_mapping(key) {
        FrameMapping::Mapped(FrameKind::Text(id)) => {
            let frame_id = FrameId::new(id).map_err(|source| TagWriteError::InvalidFrame {
                key: key.to_string(),
                frame_id: id,
                source,
            })?;
            Frame::Text(TextInformationFrame::new(
                frame_id,
                TextEncoding::UTF8,
                content,
            ))
        }
        FrameMapping::Mapped(FrameKind::Comment) => Frame::Comment(CommentFrame::new(
            TextEncoding::UTF8,
            UNKNOWN_LANGUAGE,
            String::new(),
            content,
        )),
        FrameMapping::Generic { description } => Frame::UserText(ExtendedTextFrame::new(
            TextEncoding::UTF8,
            description.to_string(),
            content,
        )),
    };

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_map_to_frames() {
        assert_eq!(
            frame_mapping("title"),
            FrameMapping::Mapped(FrameKind::Text("TIT2"))
        );
        assert_eq!(
            frame_mapping("album artist"),
            FrameMapping::Mapped(FrameKind::Text("TPE2"))
        );
        assert_eq!(frame_mapping("comment"), FrameMapping::Mapped(FrameKind::Comment));
    }

    #[test]
    fn test_unknown_key_is_generic() {
        assert_eq!(
            frame_mapping("musicbrainz_albumid"),
            FrameMapping::Generic {
                description: "musicbrainz_albumid"
            }
        );
    }

    #[test]
    fn test_label_and_publisher_share_a_frame() {
        assert_eq!(frame_mapping("label"), frame_mapping("publisher"));
    }

    #[test]
    fn test_table_ids_are_valid() {
        for (key, kind) in FRAME_TABLE {
            assert_eq!(kind.id().len(), 4, "bad frame id for {key}");
            assert!(build_frame(key, &["x".to_string()]).is_ok());
        }
    }

    #[test]
    fn test_build_text_frame() {
        let frame = build_frame("artist", &["A".to_string(), "B".to_string()]).unwrap();
        match frame {
            Frame::Text(text) => assert_eq!(text.value, "A\0B"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_build_generic_frame() {
        let frame = build_frame("catalognumber", &["CAT-001".to_string()]).unwrap();
        match frame {
            Frame::UserText(text) => {
                assert_eq!(text.description, "catalognumber");
                assert_eq!(text.content, "CAT-001");
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_build_comment_frame() {
        let frame = build_frame("comment", &["ripped with care".to_string()]).unwrap();
        match frame {
            Frame::Comment(comment) => assert_eq!(comment.content, "ripped with care"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}
