use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::path::PathBuf;

/// Per-file line counts of what the validator's model changed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub file_name: String,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl FileChange {
    pub fn between(file_name: &str, before: &str, after: &str) -> Self {
        let diff = TextDiff::from_lines(before, after);
        let (mut lines_added, mut lines_removed) = (0, 0);
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => lines_added += 1,
                ChangeTag::Delete => lines_removed += 1,
                ChangeTag::Equal => {}
            }
        }
        Self {
            file_name: file_name.to_string(),
            lines_added,
            lines_removed,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub validated_folder: PathBuf,
    pub fixed_files: Vec<String>,
    pub changes: Vec<FileChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_changed_lines() {
        let change = FileChange::between("index.html", "a\nb\nc\n", "a\nB\nc\nd\n");
        assert_eq!(change.lines_added, 2);
        assert_eq!(change.lines_removed, 1);

        let unchanged = FileChange::between("styles.css", "body{}\n", "body{}\n");
        assert_eq!((unchanged.lines_added, unchanged.lines_removed), (0, 0));
    }
}
