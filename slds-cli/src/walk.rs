//! Finding component files and grouping them into bundles

use ignore::WalkBuilder;
use slds_parser::{Bundle, Entry, SourceKind};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn is_source(path: &Path) -> bool {
    SourceKind::from_path(path) != SourceKind::Unsupported
}

/// Source files under `roots`, keyed by the directory that holds them.
/// Directories are walked honoring `.gitignore` and `.ignore` files.
pub fn component_files(roots: &[PathBuf]) -> BTreeMap<PathBuf, Vec<PathBuf>> {
    let mut components: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    let mut add = |path: &Path| {
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        components.entry(directory).or_default().push(path.to_path_buf());
    };

    for root in roots {
        if root.is_file() {
            if is_source(root) {
                add(root);
            }
            continue;
        }
        for result in WalkBuilder::new(root).build() {
            match result {
                Ok(found) => {
                    let is_file = found.file_type().is_some_and(|kind| kind.is_file());
                    if is_file && is_source(found.path()) {
                        add(found.path());
                    }
                }
                Err(err) => tracing::warn!(%err, "skipping unreadable path"),
            }
        }
    }

    for files in components.values_mut() {
        files.sort();
        files.dedup();
    }
    components
}

/// Reads the files of one component. Unreadable files are left out.
pub fn read_bundle(files: &[PathBuf]) -> Bundle {
    let entries = files
        .iter()
        .filter_map(|path| match Entry::read(path) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(%err, "skipping file");
                None
            }
        })
        .collect();
    Bundle::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn groups_files_by_directory() {
        let root = tempfile::tempdir().expect("temp dir");
        for (dir, file) in [
            ("card", "card.css"),
            ("card", "card.html"),
            ("card", "README.md"),
            ("tile", "tile.js"),
        ] {
            let dir = root.path().join(dir);
            fs::create_dir_all(&dir).expect("dir");
            fs::write(dir.join(file), "").expect("file");
        }

        let components = component_files(&[root.path().to_path_buf()]);
        assert_eq!(components.len(), 2);
        let card = &components[&root.path().join("card")];
        let names: Vec<_> = card
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["card.css", "card.html"]);
    }

    #[test]
    fn single_files_are_accepted() {
        let root = tempfile::tempdir().expect("temp dir");
        let file = root.path().join("card.css");
        fs::write(&file, ".a {}").expect("file");

        let components = component_files(&[file.clone(), file.clone()]);
        assert_eq!(components[root.path()], vec![file.clone()]);
        assert_eq!(read_bundle(&components[root.path()]).entries().len(), 1);
    }
}
