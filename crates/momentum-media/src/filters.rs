//! FFmpeg video filter definitions.

use std::path::Path;

/// Overlay styling applied to every burned-in caption.
pub const OVERLAY_FONT_SIZE: u32 = 24;
pub const OVERLAY_FONT_COLOR: &str = "white";
pub const OVERLAY_BOX_COLOR: &str = "black@0.5";
/// Distance from the bottom edge in pixels.
pub const OVERLAY_BOTTOM_MARGIN: u32 = 10;

/// Escape a value for use as one filter option inside a `-vf` graph.
///
/// ffmpeg unescapes the graph first and the option list second, so the value
/// is escaped for the option level and the result again for the graph level.
pub fn escape_filter_value(value: &str) -> String {
    let option_level = escape_chars(value, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Bottom-centred caption on a half-transparent box.
///
/// The caption is read verbatim from `textfile`; drawtext expansion is off so
/// `%` needs no escaping.
pub fn drawtext_overlay(textfile: &Path) -> String {
    format!(
        "drawtext=textfile={}:expansion=none:x=(w-text_w)/2:y=h-th-{}:fontcolor={}:fontsize={}:box=1:boxcolor={}",
        escape_filter_value(&textfile.to_string_lossy()),
        OVERLAY_BOTTOM_MARGIN,
        OVERLAY_FONT_COLOR,
        OVERLAY_FONT_SIZE,
        OVERLAY_BOX_COLOR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unescape one token the way ffmpeg's `av_get_token` does, stopping at
    /// an unescaped, unquoted terminator.
    fn get_token<'a>(input: &'a str, terms: &[char]) -> (String, &'a str) {
        let mut out = String::new();
        let mut chars = input.char_indices();
        while let Some((i, c)) = chars.next() {
            if terms.contains(&c) {
                return (out, &input[i..]);
            }
            match c {
                '\\' => {
                    if let Some((_, next)) = chars.next() {
                        out.push(next);
                    }
                }
                '\'' => {
                    for (_, q) in chars.by_ref() {
                        if q == '\'' {
                            break;
                        }
                        out.push(q);
                    }
                }
                _ => out.push(c),
            }
        }
        (out, "")
    }

    /// Graph level, then option level.
    fn parse_filter(filter: &str) -> (String, Vec<(String, String)>) {
        let (name, args) = filter.split_once('=').unwrap();
        let (args, rest) = get_token(args, &['[', ']', ',', ';']);
        assert!(rest.is_empty(), "graph parser stopped early at {rest:?}");

        let mut options = Vec::new();
        let mut remaining = args.as_str();
        while !remaining.is_empty() {
            let (key, rest) = get_token(remaining, &['=', ':']);
            let rest = rest.strip_prefix('=').unwrap();
            let (value, rest) = get_token(rest, &[':']);
            options.push((key, value));
            remaining = rest.strip_prefix(':').unwrap_or(rest);
        }
        (name.to_string(), options)
    }

    fn option<'a>(options: &'a [(String, String)], key: &str) -> &'a str {
        options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("/tmp/overlay.txt"), "/tmp/overlay.txt");
        assert_eq!(escape_filter_value("a:b"), "a\\\\:b");
        assert_eq!(escape_filter_value("a,b"), "a\\,b");
    }

    #[test]
    fn test_drawtext_overlay_survives_filter_parsing() {
        let path = Path::new("/tmp/it's [a], b; c:d\\e/overlay_000.txt");
        let (name, options) = parse_filter(&drawtext_overlay(path));

        assert_eq!(name, "drawtext");
        assert_eq!(option(&options, "textfile"), path.to_string_lossy());
        assert_eq!(option(&options, "expansion"), "none");
        assert_eq!(option(&options, "x"), "(w-text_w)/2");
        assert_eq!(option(&options, "y"), "h-th-10");
        assert_eq!(option(&options, "boxcolor"), "black@0.5");
    }

    #[test]
    fn test_drawtext_overlay_plain_path() {
        assert_eq!(
            drawtext_overlay(Path::new("/w/overlay_001.txt")),
            "drawtext=textfile=/w/overlay_001.txt:expansion=none:x=(w-text_w)/2:y=h-th-10:fontcolor=white:fontsize=24:box=1:boxcolor=black@0.5"
        );
    }
}
