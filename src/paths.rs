//! Path helpers: `~` expansion, lexical normalisation and relative paths.
use std::path::{Component, Path, PathBuf};

/// The current user's home directory, from `$HOME`.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
///
/// Paths not starting with `~` (and `~user` forms) are returned unchanged.
#[must_use]
pub fn expand_user(path: &Path) -> PathBuf {
    expand_with(path, home_dir().as_deref())
}

fn expand_with(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Replace a leading home directory with `~` for display.
#[must_use]
pub fn shrink_user(path: &Path) -> String {
    shrink_with(path, home_dir().as_deref())
}

fn shrink_with(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && home != Path::new("/")
        && let Ok(rest) = path.strip_prefix(home)
    {
        return if rest.as_os_str().is_empty() {
            "~".to_string()
        } else {
            format!("~/{}", rest.display())
        };
    }
    path.display().to_string()
}

/// Expand `~` and make `path` absolute against the working directory.
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    let expanded = expand_user(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::path::absolute(&expanded)?
    };
    Ok(normalize(&absolute))
}

/// Lexically remove `.` segments and fold `..` into its parent.
///
/// The filesystem is never consulted, so `a/link/..` becomes `a` even when
/// `link` is a symbolic link.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Path of `target` relative to the directory `base`.
///
/// Both paths are normalised first; they should both be absolute (or both
/// relative to the same directory).
#[must_use]
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target = normalize(target);
    let base = normalize(base);
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in target.iter().skip(common) {
        out.push(component.as_os_str());
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
