//! Builds the linter invocation for one document.

use std::path::{Path, PathBuf};

use crate::error::CommandError;

/// A fully resolved linter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    /// Fixed arguments followed by the target directory.
    pub args: Vec<String>,
    /// Working directory for the process. The linter reports issue
    /// positions relative to it.
    pub cwd: PathBuf,
    /// Name the linter will use for the target file in its output.
    pub relative_filename: String,
}

/// Build the invocation that lints the package containing `file`.
///
/// Files inside `root_dir` are linted from the workspace root, so their
/// reported filenames are root-relative (`pkg/a.go`). Files outside the
/// workspace are linted from their own directory and reported by bare name.
pub fn build_invocation(
    command: &[String],
    root_dir: &Path,
    file: &Path,
) -> Result<Invocation, CommandError> {
    let (program, fixed) = command.split_first().ok_or(CommandError::Empty)?;
    let target_dir = file.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

    let (cwd, relative_filename) = match file.strip_prefix(root_dir) {
        Ok(rel) if !rel.as_os_str().is_empty() => {
            (root_dir.to_path_buf(), rel.to_string_lossy().into_owned())
        }
        _ => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (target_dir.clone(), name)
        }
    };

    let mut args = Vec::with_capacity(fixed.len() + 1);
    args.extend(fixed.iter().cloned());
    args.push(target_dir.to_string_lossy().into_owned());

    Ok(Invocation {
        program: program.clone(),
        args,
        cwd,
        relative_filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Vec<String> {
        vec!["lint".into(), "--format".into(), "json".into()]
    }

    #[cfg(not(windows))]
    #[test]
    fn file_inside_root_runs_from_root() {
        let inv = build_invocation(
            &command(),
            Path::new("/proj"),
            Path::new("/proj/pkg/a.go"),
        )
        .unwrap();
        assert_eq!(inv.program, "lint");
        assert_eq!(inv.args, vec!["--format", "json", "/proj/pkg"]);
        assert_eq!(inv.cwd, PathBuf::from("/proj"));
        assert_eq!(inv.relative_filename, "pkg/a.go");
    }

    #[cfg(not(windows))]
    #[test]
    fn file_outside_root_runs_from_its_directory() {
        let inv = build_invocation(
            &command(),
            Path::new("/proj"),
            Path::new("/elsewhere/tool/main.go"),
        )
        .unwrap();
        assert_eq!(inv.args.last().map(String::as_str), Some("/elsewhere/tool"));
        assert_eq!(inv.cwd, PathBuf::from("/elsewhere/tool"));
        assert_eq!(inv.relative_filename, "main.go");
    }

    #[cfg(not(windows))]
    #[test]
    fn sibling_directory_sharing_a_name_prefix_is_outside_root() {
        let inv = build_invocation(
            &command(),
            Path::new("/proj"),
            Path::new("/proj2/a.go"),
        )
        .unwrap();
        assert_eq!(inv.cwd, PathBuf::from("/proj2"));
        assert_eq!(inv.relative_filename, "a.go");
    }

    #[cfg(not(windows))]
    #[test]
    fn file_directly_under_root() {
        let inv =
            build_invocation(&command(), Path::new("/proj"), Path::new("/proj/main.go")).unwrap();
        assert_eq!(inv.cwd, PathBuf::from("/proj"));
        assert_eq!(inv.relative_filename, "main.go");
        assert_eq!(inv.args.last().map(String::as_str), Some("/proj"));
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = build_invocation(&[], Path::new("/proj"), Path::new("/proj/a.go")).unwrap_err();
        assert!(matches!(err, CommandError::Empty));
    }
}
