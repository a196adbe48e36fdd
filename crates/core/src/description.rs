//! Publication text describing how a transcode was produced.

use crate::quality::Quality;

/// Returns the BBCode block naming the source and the exact decode/encode
/// command line for `quality`.
pub fn transcode_description(source_url: &str, quality: Quality) -> String {
    format!(
        "[b]Source:[/b] {source_url}\n\
         [b]Transcode process:[/b] [code]flac -dcs -- input.flac | lame -S {} - output.mp3[/code]\n",
        quality.description_flags()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v0_description() {
        let text = transcode_description("https://example.org/torrents.php?id=1", Quality::V0);
        assert_eq!(
            text,
            "[b]Source:[/b] https://example.org/torrents.php?id=1\n\
             [b]Transcode process:[/b] [code]flac -dcs -- input.flac | lame -S -V 0 --vbr-new --ignore-tag-errors - output.mp3[/code]\n"
        );
    }

    #[test]
    fn test_320_description_flags() {
        let text = transcode_description("src", Quality::Cbr320);
        assert!(text.contains("lame -S -h -b 320 --ignore-tag-errors - output.mp3"));
        assert!(text.ends_with("[/code]\n"));
    }
}
