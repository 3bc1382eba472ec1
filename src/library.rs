//! In-memory document corpus loaded once at startup
//!
//! Two flat namespaces of markdown documents, keyed by file stem. The maps are
//! immutable after load and shared behind an `Arc` for the lifetime of the
//! process.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Practices,
    Templates,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Practices, Namespace::Templates];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Practices => "practices",
            Namespace::Templates => "templates",
        }
    }

    /// Capitalized singular form, used in caller-facing error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Namespace::Practices => "Practice",
            Namespace::Templates => "Template",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
pub struct DocumentLibrary {
    practices: BTreeMap<String, String>,
    templates: BTreeMap<String, String>,
}

impl DocumentLibrary {
    pub fn from_parts(
        practices: BTreeMap<String, String>,
        templates: BTreeMap<String, String>,
    ) -> Self {
        Self {
            practices,
            templates,
        }
    }

    /// Scan `<docs_dir>/practices` and `<docs_dir>/templates` for `*.md`
    /// files. A missing namespace directory yields an empty namespace; an
    /// unreadable file is skipped. Neither is fatal.
    pub fn load(docs_dir: &Path) -> Self {
        Self::from_parts(
            load_namespace_dir(&docs_dir.join(Namespace::Practices.as_str())),
            load_namespace_dir(&docs_dir.join(Namespace::Templates.as_str())),
        )
    }

    pub fn get(&self, namespace: Namespace, name: &str) -> Option<&str> {
        self.documents(namespace).get(name).map(String::as_str)
    }

    /// Document names in ascending byte order.
    pub fn names(&self, namespace: Namespace) -> Vec<String> {
        self.documents(namespace).keys().cloned().collect()
    }

    pub fn entries(&self, namespace: Namespace) -> impl Iterator<Item = (&str, &str)> {
        self.documents(namespace)
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }

    pub fn count(&self, namespace: Namespace) -> usize {
        self.documents(namespace).len()
    }

    fn documents(&self, namespace: Namespace) -> &BTreeMap<String, String> {
        match namespace {
            Namespace::Practices => &self.practices,
            Namespace::Templates => &self.templates,
        }
    }
}

fn load_namespace_dir(dir: &Path) -> BTreeMap<String, String> {
    let mut documents = BTreeMap::new();

    if !dir.is_dir() {
        warn!(directory = %dir.display(), "namespace directory not found");
        return documents;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(directory = %dir.display(), error = %err, "unable to scan namespace directory");
            return documents;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(OsStr::to_str) != Some("md") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(OsStr::to_str) else {
            continue;
        };

        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(document = name, "loaded document");
                documents.insert(name.to_string(), content);
            }
            Err(err) => {
                error!(document = name, error = %err, "failed to read document, skipping");
            }
        }
    }

    documents
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use super::{DocumentLibrary, Namespace};

    #[test]
    fn names_are_byte_ordered() {
        let practices = BTreeMap::from([
            ("zebra".to_string(), "z".to_string()),
            ("Alpha".to_string(), "a".to_string()),
            ("alpha".to_string(), "a".to_string()),
        ]);
        let library = DocumentLibrary::from_parts(practices, BTreeMap::new());

        assert_eq!(
            library.names(Namespace::Practices),
            vec!["Alpha".to_string(), "alpha".to_string(), "zebra".to_string()]
        );
    }

    #[test]
    fn load_reads_markdown_and_ignores_other_files() {
        let docs_dir = tempfile::tempdir().expect("temp dir");
        let practices_dir = docs_dir.path().join("practices");
        fs::create_dir(&practices_dir).expect("practices dir");
        fs::write(practices_dir.join("code-review.md"), "# Code Review\nbody").expect("write");
        fs::write(practices_dir.join("notes.txt"), "not a document").expect("write");

        let library = DocumentLibrary::load(docs_dir.path());

        assert_eq!(library.count(Namespace::Practices), 1);
        assert_eq!(
            library.get(Namespace::Practices, "code-review"),
            Some("# Code Review\nbody")
        );
        assert_eq!(library.get(Namespace::Practices, "notes"), None);
    }

    #[test]
    fn missing_namespace_directory_is_empty_not_fatal() {
        let docs_dir = tempfile::tempdir().expect("temp dir");

        let library = DocumentLibrary::load(docs_dir.path());

        assert_eq!(library.count(Namespace::Practices), 0);
        assert_eq!(library.count(Namespace::Templates), 0);
        assert!(library.names(Namespace::Templates).is_empty());
    }

    #[test]
    fn entries_expose_name_and_content() {
        let templates = BTreeMap::from([("runbook".to_string(), "# Runbook".to_string())]);
        let library = DocumentLibrary::from_parts(BTreeMap::new(), templates);

        let entries: Vec<_> = library.entries(Namespace::Templates).collect();
        assert_eq!(entries, vec![("runbook", "# Runbook")]);
    }
}
