//! Path helpers

use std::path::PathBuf;

/// Expand a user-supplied path: `~` and `~/...` resolve against the home
/// directory, relative paths against the current directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    let expanded = match path {
        "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => match path.strip_prefix("~/").zip(dirs::home_dir()) {
            Some((rest, home)) => home.join(rest),
            None => PathBuf::from(path),
        },
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_unchanged() {
        assert_eq!(expand_path("/etc/pagefilter.json"), PathBuf::from("/etc/pagefilter.json"));
    }

    #[test]
    fn test_relative_becomes_absolute() {
        let expanded = expand_path("data/pagefilter.db");
        assert!(expanded.is_absolute());
        assert!(expanded.ends_with("data/pagefilter.db"));
    }

    #[test]
    fn test_tilde_expansion() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/.pagefilter"), home.join(".pagefilter"));
        }
    }
}
