use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const IMMOCHECK_DIR: &str = ".immocheck";

pub const CONFIG_FILE: &str = ".immocheck/config.yaml";
pub const MIRROR_FILE: &str = ".immocheck/directory.yaml";
pub const HISTORY_FILE: &str = ".immocheck/history.jsonl";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn immocheck_dir(root: &Path) -> PathBuf {
    root.join(IMMOCHECK_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn mirror_path(root: &Path) -> PathBuf {
    root.join(MIRROR_FILE)
}

pub fn history_path(root: &Path) -> PathBuf {
    root.join(HISTORY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/agency");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/agency/.immocheck/config.yaml")
        );
        assert_eq!(
            mirror_path(root),
            PathBuf::from("/tmp/agency/.immocheck/directory.yaml")
        );
        assert_eq!(
            history_path(root),
            PathBuf::from("/tmp/agency/.immocheck/history.jsonl")
        );
    }
}
