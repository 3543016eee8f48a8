//! What to launch: executable path plus operator-supplied parameters.

use std::path::{Path, PathBuf};

/// Executable and extra parameters for the dedicated server.
///
/// `params` is kept as the operator typed it (that is what gets stored);
/// [`LaunchSpec::params`] splits it into arguments on whitespace, honouring
/// double quotes: `+hostname "My Server"` → `["+hostname", "My Server"]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    executable: PathBuf,
    params: String,
}

impl LaunchSpec {
    /// Creates a launch spec.
    pub fn new(executable: impl Into<PathBuf>, params: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            params: params.into(),
        }
    }

    /// Path of the server executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Extra parameters as entered.
    pub fn raw_params(&self) -> &str {
        &self.params
    }

    /// Returns a copy with a different executable.
    #[must_use]
    pub fn with_executable(&self, executable: impl Into<PathBuf>) -> Self {
        Self::new(executable, self.params.clone())
    }

    /// Returns a copy with different parameters.
    #[must_use]
    pub fn with_params(&self, params: impl Into<String>) -> Self {
        Self::new(self.executable.clone(), params)
    }

    /// Extra parameters split into arguments.
    pub fn params(&self) -> Vec<String> {
        let mut args = Vec::new();
        let mut current = String::new();
        let mut quoted = false;
        let mut pending = false;

        for c in self.params.chars() {
            match c {
                '"' => {
                    quoted = !quoted;
                    pending = true;
                }
                c if c.is_whitespace() && !quoted => {
                    if pending {
                        args.push(std::mem::take(&mut current));
                        pending = false;
                    }
                }
                c => {
                    current.push(c);
                    pending = true;
                }
            }
        }
        if pending {
            args.push(current);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(params: &str) -> Vec<String> {
        LaunchSpec::new("srv", params).params()
    }

    #[test]
    fn test_empty_params() {
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
    }

    #[test]
    fn test_whitespace_split() {
        assert_eq!(split("+map  lobby\t-tickrate 66"), ["+map", "lobby", "-tickrate", "66"]);
    }

    #[test]
    fn test_quotes_group_words() {
        assert_eq!(
            split(r#"+hostname "My Server" +pw """#),
            ["+hostname", "My Server", "+pw", ""]
        );
    }

    #[test]
    fn test_with_params_keeps_executable() {
        let a = LaunchSpec::new("/srv/a", "x");
        let b = a.with_params("y z");
        assert_eq!(b.executable(), Path::new("/srv/a"));
        assert_eq!(b.raw_params(), "y z");
    }
}
