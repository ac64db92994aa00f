use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::Url;
use twox_hash::XxHash64;

pub(crate) fn compute_content_hash(content: &str) -> u64 {
    let mut hasher = XxHash64::default();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Path used for the document model: relative to the workspace root when the
/// file lives under it, so imports resolve against the project index.
pub(crate) fn document_path(root: Option<&Path>, uri: &Url) -> String {
    let Ok(file) = uri.to_file_path() else {
        return uri.path().rsplit('/').next().unwrap_or_default().to_string();
    };
    project_relative(root, &file)
}

pub(crate) fn project_relative(root: Option<&Path>, file: &Path) -> String {
    let relative: PathBuf = match root.and_then(|r| file.strip_prefix(r).ok()) {
        Some(rel) => rel.to_path_buf(),
        None => file.file_name().map(PathBuf::from).unwrap_or_default(),
    };
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path_relative_to_root() {
        let root = Path::new("/work/project");
        let uri = Url::parse("file:///work/project/suites/login.robot").unwrap();
        assert_eq!(document_path(Some(root), &uri), "suites/login.robot");

        let outside = Url::parse("file:///tmp/other.robot").unwrap();
        assert_eq!(document_path(Some(root), &outside), "other.robot");
        assert_eq!(document_path(None, &uri), "login.robot");
    }

    #[test]
    fn test_content_hash_changes_with_content() {
        assert_eq!(compute_content_hash("a"), compute_content_hash("a"));
        assert_ne!(compute_content_hash("a"), compute_content_hash("b"));
    }
}
