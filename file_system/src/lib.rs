use std::{
    collections::HashSet,
    fs, io,
    path::{Component, Path, PathBuf},
};

use directories_next::ProjectDirs;

/// Returns the directory log files are written to, inside the default data dir
/// for the application. Falls back to `./logs` when no home directory is known.
pub fn get_log_dir() -> PathBuf {
    get_project_dirs()
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logs")
}

fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "s3deploy", "s3deploy")
}

/// Collects every file under `root` that should be uploaded.
///
/// The tree is walked depth first in directory listing order. Any entry whose
/// file name is in `ignore_files` is skipped, which for a directory prunes the
/// whole subtree. Symbolic links are not followed and are returned as files.
pub fn collect_upload_files(root: &Path, ignore_files: &HashSet<String>) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(root, ignore_files, &mut files)?;
    Ok(files)
}

fn collect_into(dir: &Path, ignore_files: &HashSet<String>, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();

        if ignore_files.contains(file_name.to_string_lossy().as_ref()) {
            tracing::debug!("Ignoring {}", entry.path().display());
            continue;
        }

        if entry.file_type()?.is_dir() {
            collect_into(&entry.path(), ignore_files, files)?;
        } else {
            files.push(entry.path());
        }
    }
    Ok(())
}

/// Object key for `path`: its location relative to `root`, `/` separated and
/// without a leading separator.
///
/// A path outside `root` keeps all of its normal components.
pub fn object_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }

    fn keys(root: &Path, files: &[PathBuf]) -> HashSet<String> {
        files.iter().map(|f| object_key(root, f)).collect()
    }

    #[test]
    fn test_ignored_file_is_excluded() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a.txt"));
        write(&root.join("sub/b.txt"));
        write(&root.join("ignore.txt"));

        let ignore = HashSet::from(["ignore.txt".to_string()]);
        let files = collect_upload_files(root, &ignore).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(
            keys(root, &files),
            HashSet::from(["a.txt".to_string(), "sub/b.txt".to_string()])
        );
    }

    #[test]
    fn test_ignored_name_matches_at_any_depth() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("index.html"));
        write(&root.join("deep/nested/.DS_Store"));
        write(&root.join("deep/nested/page.html"));
        write(&root.join(".DS_Store"));

        let ignore = HashSet::from([".DS_Store".to_string()]);
        let files = collect_upload_files(root, &ignore).unwrap();

        assert_eq!(
            keys(root, &files),
            HashSet::from([
                "index.html".to_string(),
                "deep/nested/page.html".to_string()
            ])
        );
    }

    #[test]
    fn test_ignored_directory_prunes_subtree() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("index.html"));
        write(&root.join("node_modules/pkg/index.js"));
        write(&root.join("node_modules/readme.md"));

        let ignore = HashSet::from(["node_modules".to_string()]);
        let files = collect_upload_files(root, &ignore).unwrap();

        assert_eq!(keys(root, &files), HashSet::from(["index.html".to_string()]));
    }

    #[test]
    fn test_directories_are_not_listed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("empty/inner")).unwrap();
        write(&root.join("css/site.css"));

        let files = collect_upload_files(root, &HashSet::new()).unwrap();

        assert_eq!(files, vec![root.join("css").join("site.css")]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let result = collect_upload_files(&dir.path().join("missing"), &HashSet::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_object_key_ignores_trailing_separator_on_root() {
        let file = Path::new("dist/css/site.css");
        assert_eq!(object_key(Path::new("dist"), file), "css/site.css");
        assert_eq!(object_key(Path::new("dist/"), file), "css/site.css");
        assert_eq!(object_key(Path::new("./dist"), Path::new("./dist/a.txt")), "a.txt");
    }

    #[test]
    fn test_object_key_outside_root() {
        assert_eq!(
            object_key(Path::new("/srv/site"), Path::new("/tmp/other.txt")),
            "tmp/other.txt"
        );
    }
}
