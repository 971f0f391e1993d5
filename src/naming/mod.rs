use chrono::{DateTime, SecondsFormat, Utc};

/// Processed stickers always come back from the service as PNG.
pub const OUTPUT_EXTENSION: &str = "png";

const STICKER_SUFFIX: &str = "sticker";

/// Derives the download filename for a processed sticker from the original
/// filename and an instant. Pure given its inputs.
///
/// `"cat.png"` at 2024-01-02T03:04:05.000Z becomes
/// `"cat-sticker-2024-01-02T03-04-05-000Z.png"`.
pub fn sticker_file_name(original_name: &str, now: DateTime<Utc>) -> String {
    let stem = strip_extension(original_name);
    let timestamp = filesystem_safe_timestamp(now);
    format!("{stem}-{STICKER_SUFFIX}-{timestamp}.{OUTPUT_EXTENSION}")
}

fn filesystem_safe_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Strips the last extension segment: the longest suffix of `.` followed by
/// characters that are neither `.` nor `/`. Names without such a suffix pass
/// through unchanged.
fn strip_extension(name: &str) -> &str {
    let Some(dot) = name.rfind('.') else {
        return name;
    };
    let suffix = &name[dot + 1..];
    if suffix.is_empty() || suffix.contains('.') || suffix.contains('/') {
        return name;
    }
    &name[..dot]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn derives_the_documented_example_name() {
        assert_eq!(
            sticker_file_name("cat.png", fixed_instant()),
            "cat-sticker-2024-01-02T03-04-05-000Z.png"
        );
    }

    #[test]
    fn output_extension_is_fixed_regardless_of_input_extension() {
        let name = sticker_file_name("photo.jpeg", fixed_instant());
        assert!(name.ends_with(".png"));
        assert!(name.starts_with("photo-sticker-"));
    }

    #[test]
    fn timestamp_segment_contains_no_colons_or_periods() {
        let name = sticker_file_name("cat.png", fixed_instant());
        let timestamp = name
            .strip_prefix("cat-sticker-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .expect("name should follow the documented shape");
        assert!(!timestamp.contains(':'));
        assert!(!timestamp.contains('.'));
    }

    #[test]
    fn millisecond_precision_is_preserved() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(678);
        assert_eq!(
            sticker_file_name("cat.png", now),
            "cat-sticker-2024-01-02T03-04-05-678Z.png"
        );
    }

    #[test]
    fn strip_extension_removes_only_the_last_segment() {
        assert_eq!(strip_extension("cat.png"), "cat");
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_extension("pasted-image.webp"), "pasted-image");
    }

    #[test]
    fn strip_extension_leaves_names_without_a_real_extension_alone() {
        assert_eq!(strip_extension("cat"), "cat");
        assert_eq!(strip_extension("cat."), "cat.");
        assert_eq!(strip_extension("dir.v1/cat"), "dir.v1/cat");
    }

    #[test]
    fn strip_extension_handles_dotfile_style_names() {
        assert_eq!(strip_extension(".png"), "");
        let name = sticker_file_name(".png", fixed_instant());
        assert_eq!(name, "-sticker-2024-01-02T03-04-05-000Z.png");
    }
}
