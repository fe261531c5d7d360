//! Addon manifests: which modules exist on the addon path, what they depend
//! on, and which Python packages they declare.
//!
//! Manifests are Python dict literals. Only the `depends` and `python` lists
//! are read, so string lists are pulled out with regexes instead of
//! evaluating the file.

use odev_core::UserError;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

const MANIFEST: &str = "__manifest__.py";

static DEPENDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)['"]depends['"]\s*:\s*\[(.*?)\]"#).expect("depends regex is valid")
});

static PYTHON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)['"]python['"]\s*:\s*\[(.*?)\]"#).expect("python regex is valid")
});

static STRING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("string regex is valid"));

/// Modules found on an addon path, by directory name.
#[derive(Debug, Default)]
pub struct ModuleIndex {
    manifests: HashMap<String, PathBuf>,
}

/// Everything the requested modules pull in.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DependencyClosure {
    pub modules: BTreeSet<String>,
    pub python: BTreeSet<String>,
}

impl ModuleIndex {
    /// Immediate subdirectories holding a manifest. The first path that
    /// provides a module name wins; missing directories are skipped.
    pub fn scan(addons_paths: &[PathBuf]) -> Self {
        let mut manifests = HashMap::new();
        for root in addons_paths {
            let Ok(entries) = std::fs::read_dir(root) else {
                continue;
            };
            for entry in entries.filter_map(|entry| entry.ok()) {
                let manifest = entry.path().join(MANIFEST);
                if !manifest.is_file() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    manifests.entry(name.to_string()).or_insert(manifest);
                }
            }
        }
        debug!(count = manifests.len(), "indexed addon modules");
        Self { manifests }
    }

    /// Breadth-first walk of `depends` starting from `requested`.
    ///
    /// Fails with [`UserError::MissingModules`] when any module along the way
    /// has no manifest. An unreadable manifest counts as present with no
    /// dependencies.
    pub fn resolve(&self, requested: &[String]) -> Result<DependencyClosure, UserError> {
        let mut closure = DependencyClosure::default();
        let mut missing = BTreeSet::new();
        let mut queue: VecDeque<String> = requested.iter().cloned().collect();

        while let Some(module) = queue.pop_front() {
            if closure.modules.contains(&module) || missing.contains(&module) {
                continue;
            }
            let Some(path) = self.manifests.get(&module) else {
                missing.insert(module);
                continue;
            };
            closure.modules.insert(module);

            let fields = match read_manifest(path) {
                Ok(fields) => fields,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable manifest");
                    continue;
                }
            };
            closure.python.extend(fields.python);
            queue.extend(
                fields
                    .depends
                    .into_iter()
                    .filter(|dep| !closure.modules.contains(dep)),
            );
        }

        if missing.is_empty() {
            return Ok(closure);
        }
        let (requested_missing, transitive): (Vec<String>, Vec<String>) = missing
            .into_iter()
            .partition(|module| requested.contains(module));
        Err(UserError::MissingModules {
            requested: requested_missing,
            transitive,
        })
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ManifestFields {
    depends: Vec<String>,
    python: Vec<String>,
}

fn read_manifest(path: &Path) -> std::io::Result<ManifestFields> {
    std::fs::read_to_string(path).map(|source| parse_manifest(&source))
}

fn parse_manifest(source: &str) -> ManifestFields {
    let code: String = source
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    ManifestFields {
        depends: string_list(&DEPENDS_RE, &code),
        python: string_list(&PYTHON_RE, &code),
    }
}

fn string_list(list_re: &Regex, code: &str) -> Vec<String> {
    list_re
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .flat_map(|body| {
            STRING_RE
                .captures_iter(body.as_str())
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}
