use std::path::Path;

use vidshelf_state::intake::PickedFile;

use crate::error::MediaError;

/// Walks `root` recursively and returns every regular file, with relative
/// paths that start at the root folder's own name. Symlinks to files are
/// listed; symlinked directories are not followed.
pub fn scan_folder(root: &Path) -> Result<Vec<PickedFile>, MediaError> {
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let top = std::fs::read_dir(root).map_err(|source| MediaError::ReadFolder {
        path: root.to_path_buf(),
        source,
    })?;

    let mut results = Vec::new();
    let mut stack = vec![(top, root_name)];
    while let Some((entries, prefix)) = stack.pop() {
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().to_string();
            let relative_path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            let path = entry.path();

            if file_type.is_dir() {
                match std::fs::read_dir(&path) {
                    Ok(children) => stack.push((children, relative_path)),
                    Err(e) => tracing::debug!(path = %path.display(), "skipping folder: {e}"),
                }
            } else if file_type.is_file() || file_type.is_symlink() {
                // Linked files are kept; linked directories are not walked.
                let metadata = match std::fs::metadata(&path) {
                    Ok(m) if m.is_file() => m,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::debug!(path = %path.display(), "skipping unreadable file: {e}");
                        continue;
                    }
                };
                results.push(PickedFile {
                    name,
                    size: metadata.len(),
                    relative_path,
                    path,
                });
            }
        }
    }

    results.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::debug!(root = %root.display(), files = results.len(), "scanned folder");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn walks_nested_folders_with_root_prefixed_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("movies");
        fs::create_dir_all(root.join("trips/2020")).unwrap();
        fs::write(root.join("a.mp4"), b"abc").unwrap();
        fs::write(root.join("notes.txt"), b"x").unwrap();
        fs::write(root.join("trips/2020/beach.MOV"), b"12345").unwrap();

        let files = scan_folder(&root).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["movies/a.mp4", "movies/notes.txt", "movies/trips/2020/beach.MOV"]
        );

        let beach = &files[2];
        assert_eq!(beach.name, "beach.MOV");
        assert_eq!(beach.size, 5);
        assert_eq!(beach.path, root.join("trips/2020/beach.MOV"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_listed_but_linked_folders_are_not_walked() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir_all(outside.join("nested")).unwrap();
        fs::write(outside.join("real.mp4"), b"1234567").unwrap();
        fs::write(outside.join("nested/hidden.mp4"), b"x").unwrap();

        let root = dir.path().join("picked");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("plain.mp4"), b"ab").unwrap();
        std::os::unix::fs::symlink(outside.join("real.mp4"), root.join("linked.mp4")).unwrap();
        std::os::unix::fs::symlink(outside.join("nested"), root.join("shortcut")).unwrap();
        std::os::unix::fs::symlink(outside.join("gone.mp4"), root.join("dangling.mp4")).unwrap();

        let files = scan_folder(&root).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["picked/linked.mp4", "picked/plain.mp4"]);
        assert_eq!(files[0].name, "linked.mp4");
        assert_eq!(files[0].size, 7);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_folder(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, MediaError::ReadFolder { .. }));
    }

    #[test]
    fn empty_folder_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_folder(dir.path()).unwrap().is_empty());
    }
}
