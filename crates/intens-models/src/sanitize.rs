//! Upload filename sanitization.
//!
//! Uploaded filenames end up embedded in on-disk storage keys, so
//! anything that could escape the upload directory or confuse a shell
//! is stripped before use.

/// Fallback name when sanitization leaves nothing usable.
const FALLBACK_NAME: &str = "upload";

/// Reduce an untrusted filename to a safe storage-key component.
///
/// Keeps ASCII alphanumerics plus `.`, `-` and `_`; any run of other
/// characters collapses to a single `_`. Path separators are treated as
/// boundaries and only the final component survives. The result is never
/// empty and never starts with a dot or dash.
pub fn sanitize_filename(name: &str) -> String {
    let last_component = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let mut out = String::with_capacity(last_component.len());
    let mut gap = false;
    for c in last_component.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            out.push(c);
            gap = false;
        } else if !gap && !out.is_empty() {
            out.push('_');
            gap = true;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '-' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(sanitize_filename("cat.png"), "cat.png");
        assert_eq!(sanitize_filename("my-photo_2.jpeg"), "my-photo_2.jpeg");
    }

    #[test]
    fn test_path_components_are_dropped() {
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("a/b/c/dog.gif"), "dog.gif");
    }

    #[test]
    fn test_traversal_cannot_survive() {
        assert_eq!(sanitize_filename("../../secret"), "secret");
        assert_eq!(sanitize_filename(".."), FALLBACK_NAME);
        assert_eq!(sanitize_filename("..."), FALLBACK_NAME);
    }

    #[test]
    fn test_special_characters_collapse() {
        assert_eq!(sanitize_filename("my file (1).png"), "my_file_1_.png");
        assert_eq!(sanitize_filename("cafe\u{301} photo.jpg"), "cafe_photo.jpg");
    }

    #[test]
    fn test_hidden_files_are_unhidden() {
        assert_eq!(sanitize_filename(".bashrc"), "bashrc");
    }

    #[test]
    fn test_empty_and_garbage_fall_back() {
        assert_eq!(sanitize_filename(""), FALLBACK_NAME);
        assert_eq!(sanitize_filename("///"), FALLBACK_NAME);
        assert_eq!(sanitize_filename("\u{1F600}\u{1F600}"), FALLBACK_NAME);
    }
}
