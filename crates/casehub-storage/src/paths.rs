//! Object key conventions for case assets.
//!
//! Every asset of a case lives under `demos/{caseId}/`, so deletion can be
//! driven by convention (a prefix sweep) rather than a manifest. Keys are
//! always built from entity fields; nothing ever parses a key to recover
//! an id.

/// Root prefix all case folders live under.
pub const CASE_ROOT: &str = "demos";

/// Icon extensions accepted for case and assistant icons.
pub const ICON_EXTENSIONS: [&str; 4] = ["svg", "png", "jpg", "jpeg"];

/// Prefix containing every asset of one case (trailing slash included).
pub fn case_prefix(case_id: &str) -> String {
    format!("{CASE_ROOT}/{case_id}/")
}

/// The case configuration document.
pub fn config_path(case_id: &str) -> String {
    format!("{CASE_ROOT}/{case_id}/config.json")
}

/// The case icon.
pub fn case_icon_path(case_id: &str, ext: &str) -> String {
    format!("{CASE_ROOT}/{case_id}/icon.{ext}")
}

/// An assistant's system-prompt markdown.
pub fn assistant_markdown_path(case_id: &str, assistant_id: &str) -> String {
    format!("{CASE_ROOT}/{case_id}/markdown/{assistant_id}.md")
}

/// An assistant's icon.
pub fn assistant_icon_path(case_id: &str, assistant_id: &str, ext: &str) -> String {
    format!("{CASE_ROOT}/{case_id}/assistants/{assistant_id}/icon.{ext}")
}

/// A supporting document, keyed by its original filename.
pub fn document_path(case_id: &str, filename: &str) -> String {
    format!("{CASE_ROOT}/{case_id}/documents/{filename}")
}

/// The case explanation markdown.
pub fn explanation_path(case_id: &str) -> String {
    format!("{CASE_ROOT}/{case_id}/explanation.md")
}

/// File extension of an uploaded filename, lowercased, if it is an
/// accepted icon type.
pub fn icon_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1.to_lowercase();
    ICON_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_the_demos_convention() {
        assert_eq!(config_path("cs101"), "demos/cs101/config.json");
        assert_eq!(case_prefix("cs101"), "demos/cs101/");
        assert_eq!(
            assistant_markdown_path("cs101", "tutor"),
            "demos/cs101/markdown/tutor.md"
        );
        assert_eq!(
            assistant_icon_path("cs101", "tutor", "png"),
            "demos/cs101/assistants/tutor/icon.png"
        );
        assert_eq!(
            document_path("cs101", "syllabus.pdf"),
            "demos/cs101/documents/syllabus.pdf"
        );
    }

    #[test]
    fn icon_extension_accepts_only_known_types() {
        assert_eq!(icon_extension("avatar.PNG").as_deref(), Some("png"));
        assert_eq!(icon_extension("avatar.svg").as_deref(), Some("svg"));
        assert_eq!(icon_extension("avatar.pdf"), None);
        assert_eq!(icon_extension("noextension"), None);
    }
}
