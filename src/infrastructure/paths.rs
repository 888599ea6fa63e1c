//! Filesystem locations used by the client.
//!
//! The reaction store and the log file live in a per-user data directory,
//! following the XDG base directory convention.

use std::path::PathBuf;

/// Directory name under the platform data directory.
const APP_DIR: &str = "fesnuk";

/// Returns the default data directory for the client.
///
/// Resolves to `$XDG_DATA_HOME/fesnuk`, falling back to
/// `~/.local/share/fesnuk`, and to a directory under the system temp dir when
/// neither variable is set.
///
/// # Examples
///
/// ```
/// use fesnuk::infrastructure::get_data_dir;
///
/// let data_dir = get_data_dir();
/// assert!(data_dir.ends_with("fesnuk"));
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    let xdg = std::env::var("XDG_DATA_HOME").ok();
    let home = std::env::var("HOME").ok();
    data_dir_from(xdg.as_deref(), home.as_deref())
}

fn data_dir_from(xdg_data_home: Option<&str>, home: Option<&str>) -> PathBuf {
    match (xdg_data_home, home) {
        (Some(xdg), _) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        (_, Some(home)) if !home.is_empty() => PathBuf::from(home).join(".local").join("share").join(APP_DIR),
        _ => std::env::temp_dir().join(APP_DIR),
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or any path when `HOME` is unset, are
/// returned unchanged.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = std::env::var("HOME").ok();
    expand_tilde_with(path, home.as_deref())
}

fn expand_tilde_with(path: &str, home: Option<&str>) -> PathBuf {
    let Some(home) = home.filter(|h| !h.is_empty()) else {
        return PathBuf::from(path);
    };
    if path == "~" {
        PathBuf::from(home)
    } else if let Some(rest) = path.strip_prefix("~/") {
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        assert_eq!(
            data_dir_from(Some("/xdg"), Some("/home/ana")),
            PathBuf::from("/xdg/fesnuk")
        );
        assert_eq!(
            data_dir_from(Some(""), Some("/home/ana")),
            PathBuf::from("/home/ana/.local/share/fesnuk")
        );
    }

    #[test]
    fn no_environment_uses_temp_dir() {
        assert!(data_dir_from(None, None).starts_with(std::env::temp_dir()));
    }

    #[test]
    fn tilde_expansion() {
        let home = Some("/home/ana");
        assert_eq!(expand_tilde_with("~/data", home), PathBuf::from("/home/ana/data"));
        assert_eq!(expand_tilde_with("~", home), PathBuf::from("/home/ana"));
        assert_eq!(expand_tilde_with("/abs/~", home), PathBuf::from("/abs/~"));
        assert_eq!(expand_tilde_with("~/data", None), PathBuf::from("~/data"));
    }
}
