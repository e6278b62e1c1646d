//! Path normalization and containment checks.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Errors raised by [`safe_join`].
#[derive(Error, Debug)]
pub enum PathError {
    /// The joined path escapes the base directory.
    #[error("the joined path ({path}) is located outside of the base path component ({base})")]
    Suspicious {
        /// Absolute, normalized result of the join.
        path: PathBuf,
        /// Absolute, normalized base directory.
        base: PathBuf,
    },

    /// A relative path could not be resolved.
    #[error("cannot resolve the current directory: {0}")]
    CurrentDir(#[from] io::Error),
}

/// Normalizes `path` lexically: drops `.` and repeated separators and folds
/// `..` into its parent. `..` never climbs above the root.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component)
            }
        }
    }
    normalized
}

/// Absolute, normalized form of `path`, resolved against the current
/// directory when relative. The filesystem is not consulted, so symlinks are
/// kept as they are.
pub fn abspath(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Joins `paths` onto `base` and returns the absolute result, which must be
/// `base` itself or lie inside it.
///
/// Containment is checked component-wise, so `/srv/static2` is not inside
/// `/srv/static`. An absolute component replaces everything before it, as
/// with [`Path::join`], and is then subject to the same check.
///
/// ```
/// use cachet_utils::{PathError, safe_join};
///
/// let joined = safe_join("/srv/static", ["css", "./site.css"]).unwrap();
/// assert_eq!(joined, std::path::Path::new("/srv/static/css/site.css"));
///
/// let escaped = safe_join("/srv/static", ["../secrets"]);
/// assert!(matches!(escaped, Err(PathError::Suspicious { .. })));
/// ```
pub fn safe_join<I, P>(base: impl AsRef<Path>, paths: I) -> Result<PathBuf, PathError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let base = base.as_ref();
    let joined = paths
        .into_iter()
        .fold(base.to_path_buf(), |acc, part| acc.join(part));

    let path = abspath(joined)?;
    let base = abspath(base)?;
    if path.starts_with(&base) {
        Ok(path)
    } else {
        Err(PathError::Suspicious { path, base })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_lexically() {
        assert_eq!(normalize(Path::new("/home///nick/./a/../b")), Path::new("/home/nick/b"));
        assert_eq!(normalize(Path::new("/../..")), Path::new("/"));
    }

    #[test]
    fn relative_paths_resolve_against_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(abspath("a/../b").unwrap(), cwd.join("b"));
    }

    #[test]
    fn sibling_with_common_prefix_is_outside() {
        let result = safe_join("/srv/static", ["../static2/app.js"]);
        assert!(matches!(result, Err(PathError::Suspicious { .. })));
    }

    #[test]
    fn rejection_reports_normalized_paths() {
        match safe_join("/srv/./static", ["css", "../../etc"]) {
            Err(PathError::Suspicious { path, base }) => {
                assert_eq!(path, Path::new("/srv/etc"));
                assert_eq!(base, Path::new("/srv/static"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn base_itself_is_allowed() {
        assert_eq!(
            safe_join("/srv/static", ["css", ".."]).unwrap(),
            Path::new("/srv/static")
        );
    }

    #[test]
    fn absolute_component_must_stay_inside() {
        assert!(safe_join("/srv/static", ["/etc/passwd"]).is_err());
        assert_eq!(
            safe_join("/srv/static", ["/srv/static/js"]).unwrap(),
            Path::new("/srv/static/js")
        );
    }
}
