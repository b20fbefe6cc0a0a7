//! Name → document index over the on-disk schema corpus.
//!
//! Every `*.yaml` / `*.yml` file in the corpus directory is expected to carry
//! a top-level `typeName` (e.g. `AWS::S3::Bucket`). The index keys documents
//! by the lower-cased type name and by the same name without its vendor
//! segment (`s3::bucket`), and resolves free-form queries with
//! [`token_set_ratio`](crate::fuzzy::token_set_ratio).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::fuzzy::token_set_ratio;

/// Fuzzy matches must score strictly above this to be accepted.
pub const MATCH_THRESHOLD: u8 = 70;

const NAMESPACE_SEPARATOR: &str = "::";

/// One resolvable name and the file it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    /// Lower-cased type name or alias
    pub name: String,
    /// File name relative to the corpus directory
    pub file: String,
    /// Registered as the namespace-stripped form of a longer type name
    pub alias: bool,
}

/// A corpus file that did not make it into the index.
#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub file: String,
    pub reason: String,
}

/// Result of [`SchemaIndex::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLookup {
    /// The query resolved to a corpus entry
    pub found: bool,
    /// Document text, or the miss / read-error sentence
    pub text: String,
}

/// What the last (re)load saw.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Documents indexed under their type name
    pub loaded: usize,
    pub skipped: Vec<SkippedDocument>,
}

#[derive(Debug)]
pub struct SchemaIndex {
    root: PathBuf,
    /// Load order; fuzzy ties go to the earliest entry.
    entries: Vec<SchemaEntry>,
    by_name: HashMap<String, usize>,
    report: LoadReport,
}

impl SchemaIndex {
    /// Build the index from `dir`. A missing or unreadable directory gives an
    /// empty index, and unusable files are skipped with a warning.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let mut index = Self {
            root: dir.as_ref().to_path_buf(),
            entries: Vec::new(),
            by_name: HashMap::new(),
            report: LoadReport::default(),
        };
        index.scan();
        index
    }

    /// Throw the mapping away and scan the same directory again.
    pub fn reload(&mut self) -> &LoadReport {
        self.entries.clear();
        self.by_name.clear();
        self.report = LoadReport::default();
        self.scan();
        &self.report
    }

    fn scan(&mut self) {
        let files = match list_schema_files(&self.root) {
            Ok(files) => files,
            Err(e) => {
                if self.root.exists() {
                    warn!(dir = %self.root.display(), error = %e, "Cannot read schema directory");
                } else {
                    info!(dir = %self.root.display(), "Schema directory does not exist, index is empty");
                }
                return;
            }
        };

        for file in files {
            match read_type_name(&self.root.join(&file)) {
                Ok(type_name) => {
                    self.register(&type_name, &file);
                    self.report.loaded += 1;
                }
                Err(reason) => {
                    warn!(file = %file, reason = %reason, "Skipping schema document");
                    self.report.skipped.push(SkippedDocument { file, reason });
                }
            }
        }

        info!(
            dir = %self.root.display(),
            documents = self.report.loaded,
            names = self.entries.len(),
            skipped = self.report.skipped.len(),
            "Schema index loaded"
        );
    }

    /// Last writer wins, except that an alias never displaces a name some
    /// document declared in full.
    fn register(&mut self, type_name: &str, file: &str) {
        let name = type_name.to_lowercase();
        if let Some(alias) = strip_namespace(&name) {
            let alias = alias.to_string();
            self.insert(name, file, false);
            self.insert(alias, file, true);
        } else {
            self.insert(name, file, false);
        }
    }

    fn insert(&mut self, name: String, file: &str, alias: bool) {
        match self.by_name.get(&name) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                if alias && !entry.alias {
                    return;
                }
                if entry.file != file {
                    debug!(name = %name, old = %entry.file, new = %file, "Duplicate type name, replacing");
                    entry.file = file.to_string();
                }
                entry.alias = alias;
            }
            None => {
                self.by_name.insert(name.clone(), self.entries.len());
                self.entries.push(SchemaEntry {
                    name,
                    file: file.to_string(),
                    alias,
                });
            }
        }
    }

    /// Find the entry for a query: exact (case-insensitive) first, then the
    /// best token-set match scoring above [`MATCH_THRESHOLD`].
    pub fn resolve(&self, query: &str) -> Option<&SchemaEntry> {
        let key = query.trim().to_lowercase();
        if let Some(&i) = self.by_name.get(&key) {
            return Some(&self.entries[i]);
        }

        let mut best: Option<(usize, u8)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            let score = token_set_ratio(&key, &entry.name);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, score)) if score > MATCH_THRESHOLD => {
                debug!(query = %query, matched = %self.entries[i].name, score, "Fuzzy schema match");
                Some(&self.entries[i])
            }
            Some((i, score)) => {
                debug!(query = %query, closest = %self.entries[i].name, score, "No schema close enough");
                None
            }
            None => None,
        }
    }

    /// Resolve and read the schema document. Never fails: a miss or a read
    /// error comes back as a sentence the model can act on.
    pub fn fetch(&self, query: &str) -> String {
        self.lookup(query).text
    }

    /// [`fetch`](Self::fetch) that also says whether the query matched a
    /// corpus entry, resolving only once.
    pub fn lookup(&self, query: &str) -> SchemaLookup {
        let Some(entry) = self.resolve(query) else {
            return SchemaLookup {
                found: false,
                text: format!("No schema file found for {query}"),
            };
        };

        let text = match std::fs::read_to_string(self.root.join(&entry.file)) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %entry.file, error = %e, "Schema document unreadable");
                format!(
                    "Error opening {}: {e}. Failed to get definition of {query}",
                    entry.file
                )
            }
        };
        SchemaLookup { found: true, text }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

/// `aws::s3::bucket` → `s3::bucket`. Names with fewer than three segments
/// have no vendor prefix to drop.
fn strip_namespace(name: &str) -> Option<&str> {
    if name.matches(NAMESPACE_SEPARATOR).count() < 2 {
        return None;
    }
    name.split_once(NAMESPACE_SEPARATOR).map(|(_, rest)| rest)
}

/// Schema file names in the directory, sorted so load order is stable.
fn list_schema_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut files: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    files.sort();
    Ok(files)
}

fn read_type_name(path: &Path) -> Result<String, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("unreadable: {e}"))?;
    let doc: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))?;
    doc.get("typeName")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| "no typeName".to_string())
}

/// Shared, build-once access to a [`SchemaIndex`].
///
/// Either wraps an index that is already built, or remembers a directory and
/// builds on first use. Clones share the same index; the build runs at most
/// once no matter how many clones ask.
#[derive(Debug, Clone)]
pub struct SchemaIndexHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    dir: PathBuf,
    index: OnceLock<SchemaIndex>,
}

impl SchemaIndexHandle {
    /// Defer loading `dir` until the first lookup.
    pub fn lazy(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                dir: dir.into(),
                index: OnceLock::new(),
            }),
        }
    }

    /// Share an index that has already been built.
    pub fn ready(index: SchemaIndex) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                dir: index.root().to_path_buf(),
                index: OnceLock::from(index),
            }),
        }
    }

    /// The index, building it now if nobody has yet.
    pub fn get(&self) -> &SchemaIndex {
        self.inner.index.get_or_init(|| {
            debug!(dir = %self.inner.dir.display(), "Building schema index on first use");
            SchemaIndex::load(&self.inner.dir)
        })
    }

    pub fn is_built(&self) -> bool {
        self.inner.index.get().is_some()
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn fetch(&self, query: &str) -> String {
        self.get().fetch(query)
    }
}
