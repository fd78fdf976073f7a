//! File access for include resolution
//!
//! The parser never touches the disk directly. Hosts hand it a
//! [`FileSystem`]; [`LocalFileSystem`] reads the real one and
//! [`MemoryFileSystem`] serves a fixed set of files.

use regex::Regex;
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Glob metacharacters nginx recognizes in `include`
const GLOB_MAGIC: &[char] = &['*', '?', '['];

/// Whether an include pattern is a glob rather than a literal path
pub fn has_magic(pattern: &str) -> bool {
    pattern.contains(GLOB_MAGIC)
}

/// File access used by the parser
pub trait FileSystem: Send + Sync {
    /// Read a whole file as text
    fn open(&self, path: &str) -> io::Result<String>;

    /// Paths matching `pattern`, in any order
    fn glob(&self, pattern: &str) -> io::Result<Vec<String>>;

    /// Fail if `path` cannot be opened for reading
    fn check(&self, path: &str) -> io::Result<()> {
        self.open(path).map(|_| ())
    }
}

/// Translate one glob path component into an anchored regex
///
/// `*` and `?` never match `/`. `[!...]` negates a class. An unclosed `[`
/// is a literal bracket.
pub fn glob_component_regex(component: &str) -> Result<Regex, regex::Error> {
    let mut out = String::from("^");
    let chars: Vec<char> = component.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => match chars[i + 1..].iter().position(|c| *c == ']') {
                Some(offset) if offset > 0 => {
                    let class: String = chars[i + 1..i + 1 + offset].iter().collect();
                    out.push('[');
                    match class.strip_prefix('!') {
                        Some(negated) => {
                            out.push('^');
                            out.push_str(&negated.replace('\\', "\\\\").replace('[', "\\["));
                        }
                        None => out.push_str(&class.replace('\\', "\\\\").replace('[', "\\[")),
                    }
                    out.push(']');
                    i += offset + 1;
                }
                _ => out.push_str("\\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out.push('$');
    Regex::new(&out)
}

fn invalid_pattern(err: regex::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
}

// ============================================================
// Local disk
// ============================================================

/// The host file system
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    fn expand(base: PathBuf, rest: &[String], out: &mut Vec<String>) -> io::Result<()> {
        let Some((head, tail)) = rest.split_first() else {
            if base.exists() {
                out.push(base.to_string_lossy().into_owned());
            }
            return Ok(());
        };

        if !has_magic(head) {
            return Self::expand(base.join(head), tail, out);
        }

        let re = glob_component_regex(head).map_err(invalid_pattern)?;
        let dir = if base.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            base.clone()
        };
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            // a missing directory simply matches nothing
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') && !head.starts_with('.') {
                continue;
            }
            if re.is_match(&name) {
                names.push(name);
            }
        }
        names.sort();

        for name in names {
            let next = base.join(&name);
            if !tail.is_empty() && !next.is_dir() {
                continue;
            }
            Self::expand(next, tail, out)?;
        }
        Ok(())
    }
}

impl FileSystem for LocalFileSystem {
    fn open(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        let path = Path::new(pattern);
        let mut base = PathBuf::new();
        let mut parts: Vec<String> = Vec::new();
        for component in path.components() {
            match component {
                Component::RootDir | Component::Prefix(_) if parts.is_empty() => {
                    base.push(component.as_os_str());
                }
                other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
            }
        }

        let mut out = Vec::new();
        Self::expand(base, &parts, &mut out)?;
        Ok(out)
    }

    fn check(&self, path: &str) -> io::Result<()> {
        std::fs::File::open(path).map(|_| ())
    }
}

// ============================================================
// In memory
// ============================================================

/// A fixed set of files keyed by path
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: BTreeMap<String, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No such file or directory"))
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        let wanted: Vec<&str> = pattern.split('/').collect();
        let matchers = wanted
            .iter()
            .map(|part| glob_component_regex(part))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid_pattern)?;

        Ok(self
            .files
            .keys()
            .filter(|path| {
                let parts: Vec<&str> = path.split('/').collect();
                parts.len() == matchers.len() && parts.iter().zip(&matchers).all(|(p, re)| re.is_match(p))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_magic() {
        assert!(has_magic("sites/*.conf"));
        assert!(has_magic("a?.conf"));
        assert!(has_magic("[ab].conf"));
        assert!(!has_magic("mime.types"));
    }

    #[test]
    fn test_component_regex() {
        let re = glob_component_regex("*.conf").unwrap();
        assert!(re.is_match("default.conf"));
        assert!(!re.is_match("default.conf.bak"));

        let re = glob_component_regex("site[0-9]?.conf").unwrap();
        assert!(re.is_match("site1a.conf"));
        assert!(!re.is_match("sitex1.conf"));

        let re = glob_component_regex("[!a]*").unwrap();
        assert!(re.is_match("b.conf"));
        assert!(!re.is_match("a.conf"));

        let re = glob_component_regex("odd[.conf").unwrap();
        assert!(re.is_match("odd[.conf"));

        // an empty negated class has nothing to match
        assert!(glob_component_regex("[!].conf").is_err());
        assert!(MemoryFileSystem::new().glob("/etc/nginx/[!].conf").is_err());
    }

    #[test]
    fn test_memory_glob() {
        let fs = MemoryFileSystem::new()
            .with_file("/etc/nginx/sites/b.conf", "")
            .with_file("/etc/nginx/sites/a.conf", "")
            .with_file("/etc/nginx/sites/deep/c.conf", "")
            .with_file("/etc/nginx/nginx.conf", "");

        let found = fs.glob("/etc/nginx/sites/*.conf").unwrap();
        assert_eq!(found, vec!["/etc/nginx/sites/a.conf", "/etc/nginx/sites/b.conf"]);
        assert!(fs.glob("/etc/nginx/none/*.conf").unwrap().is_empty());
    }

    #[test]
    fn test_memory_open() {
        let fs = MemoryFileSystem::new().with_file("a.conf", "user nginx;");
        assert_eq!(fs.open("a.conf").unwrap(), "user nginx;");
        assert_eq!(fs.open("b.conf").unwrap_err().kind(), io::ErrorKind::NotFound);
        assert!(fs.check("b.conf").is_err());
    }

    #[test]
    fn test_local_glob() {
        let dir = tempfile::tempdir().unwrap();
        let sites = dir.path().join("sites");
        std::fs::create_dir(&sites).unwrap();
        std::fs::write(sites.join("b.conf"), "").unwrap();
        std::fs::write(sites.join("a.conf"), "").unwrap();
        std::fs::write(sites.join(".hidden.conf"), "").unwrap();
        std::fs::write(sites.join("notes.txt"), "").unwrap();

        let pattern = sites.join("*.conf");
        let mut found = LocalFileSystem.glob(&pattern.to_string_lossy()).unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![
                sites.join("a.conf").to_string_lossy().into_owned(),
                sites.join("b.conf").to_string_lossy().into_owned(),
            ]
        );

        let missing = dir.path().join("nowhere").join("*.conf");
        assert!(LocalFileSystem.glob(&missing.to_string_lossy()).unwrap().is_empty());
    }

    #[test]
    fn test_local_directory_glob() {
        let dir = tempfile::tempdir().unwrap();
        for site in ["one", "two"] {
            let sub = dir.path().join(site);
            std::fs::create_dir(&sub).unwrap();
            std::fs::write(sub.join("server.conf"), "").unwrap();
        }
        std::fs::write(dir.path().join("stray"), "").unwrap();

        let pattern = dir.path().join("*").join("server.conf");
        let found = LocalFileSystem.glob(&pattern.to_string_lossy()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("server.conf"));
    }
}
