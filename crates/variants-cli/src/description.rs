//! Merge-request description export.
//!
//! Writes the merge-request title and description next to the build, as
//! plain text and/or HTML depending on the requested path's extension; a
//! path without an extension writes both. Export problems are warnings,
//! never fatal.

use std::fs;
use std::path::Path;

use tracing::warn;
use variants_scm::MergeRequestDescription;

pub fn export(path: &Path, payload: &MergeRequestDescription) {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);
    let extension = extension.as_deref();

    if matches!(extension, None | Some("txt")) {
        let text = join_parts(&payload.title, &payload.description, "\n\n");
        match text {
            Some(text) => write_or_warn(&path.with_extension("txt"), &text),
            None => warn!("text description not available, but export was requested"),
        }
    }
    if matches!(extension, None | Some("html")) {
        let html = join_parts(&payload.title_html, &payload.description_html, "<br><br>");
        match html {
            Some(html) => write_or_warn(&path.with_extension("html"), &html),
            None => warn!("HTML description not available, but export was requested"),
        }
    }
}

fn join_parts(title: &str, body: &str, separator: &str) -> Option<String> {
    if title.is_empty() && body.is_empty() {
        return None;
    }
    Some(format!("{}{}{}", title, separator, body))
}

fn write_or_warn(path: &Path, content: &str) {
    if let Err(error) = fs::write(path, content) {
        warn!(path = %path.display(), %error, "writing description failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> MergeRequestDescription {
        MergeRequestDescription {
            title: "Add dark mode".to_string(),
            title_html: "<p>Add dark mode</p>".to_string(),
            description: "Implements the theme switch.".to_string(),
            description_html: "<p>Implements the theme switch.</p>".to_string(),
        }
    }

    #[test]
    fn test_export_without_extension_writes_both() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("description");

        export(&base, &payload());

        let text = fs::read_to_string(dir.path().join("description.txt")).unwrap();
        assert_eq!(text, "Add dark mode\n\nImplements the theme switch.");
        let html = fs::read_to_string(dir.path().join("description.html")).unwrap();
        assert_eq!(
            html,
            "<p>Add dark mode</p><br><br><p>Implements the theme switch.</p>"
        );
    }

    #[test]
    fn test_export_txt_extension_skips_html() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("description.txt");

        export(&base, &payload());

        assert!(dir.path().join("description.txt").exists());
        assert!(!dir.path().join("description.html").exists());
    }

    #[test]
    fn test_export_empty_payload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("description");

        export(&base, &MergeRequestDescription::default());

        assert!(!dir.path().join("description.txt").exists());
        assert!(!dir.path().join("description.html").exists());
    }
}
