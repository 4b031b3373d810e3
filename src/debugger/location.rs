//! Mapping of debugger locations (module name + character offset) to source files.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source place of a debugger location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub module: String,
    /// Bare source file name derived from the module name.
    pub file_name: String,
    /// Resolved file path, `None` if the file is not found in search paths.
    pub path: Option<PathBuf>,
    /// Character offset inside the file.
    pub offset: usize,
    /// One-based line, known only for resolved files.
    pub line: Option<usize>,
    /// Name of the enclosing definition.
    pub function: Option<String>,
}

/// Frame of a call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub number: u32,
    pub location: Location,
}

/// Definition in a source file outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    /// One-based line where the definition starts.
    pub line: usize,
    /// Definitions nested into a module.
    pub children: Vec<Definition>,
}

impl Definition {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            children: vec![],
        }
    }
}

/// Source parser collaborator, builds a definition tree of a file.
pub trait SourceOutline: Send + Sync {
    /// Return top-level definitions of a file, ordered by line.
    fn definitions(&self, file: &Path) -> Option<Vec<Definition>>;
}

/// Line based outline: recognizes `let`, `and` and `module` definitions that start at the
/// first column, and `let`/`and` definitions nested into a module.
#[derive(Default)]
pub struct TopLevelScanner;

static TOP_LET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:let|and)\s+(?:rec\s+)?([a-z_][\w']*)").expect("must compile")
});
static NESTED_LET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(?:let|and)\s+(?:rec\s+)?([a-z_][\w']*)").expect("must compile")
});
static MODULE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^module\s+(?:rec\s+)?([A-Z][\w']*)").expect("must compile"));

impl SourceOutline for TopLevelScanner {
    fn definitions(&self, file: &Path) -> Option<Vec<Definition>> {
        let source = crate::weak_error!(fs::read_to_string(file), "read source:")?;
        Some(scan_definitions(&source))
    }
}

fn scan_definitions(source: &str) -> Vec<Definition> {
    let mut definitions: Vec<Definition> = vec![];
    let mut in_module = false;

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;
        if let Some(caps) = MODULE_RE.captures(line) {
            definitions.push(Definition::new(&caps[1], line_number));
            in_module = true;
        } else if let Some(caps) = TOP_LET_RE.captures(line) {
            definitions.push(Definition::new(&caps[1], line_number));
            in_module = false;
        } else if !line.is_empty() && !line.starts_with(char::is_whitespace) {
            // `end`, `let () = ..` and alike close the nesting level
            in_module = false;
        } else if in_module {
            if let Some(caps) = NESTED_LET_RE.captures(line) {
                if let Some(module) = definitions.last_mut() {
                    module.children.push(Definition::new(&caps[1], line_number));
                }
            }
        }
    }

    definitions
}

/// Return `Foo` module source file name: `foo.ml`.
/// Dune name mangling (`Lib__Foo`) is removed first.
pub fn module_file_name(module: &str) -> String {
    let module = module.rsplit("__").next().unwrap_or(module);
    let mut chars = module.chars();
    match chars.next() {
        Some(first) => format!("{}{}.ml", first.to_lowercase(), chars.as_str()),
        None => String::new(),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Return a one-based line number of a character offset.
fn line_of_offset(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Location resolver, turns debugger locations into source file locations.
pub struct Resolver {
    project_root: PathBuf,
    search_paths: Vec<PathBuf>,
    outline: Arc<dyn SourceOutline>,
    /// Files already reported as missing during current session.
    missing: HashSet<String>,
}

impl Resolver {
    pub fn new(outline: Arc<dyn SourceOutline>) -> Self {
        Self {
            project_root: PathBuf::new(),
            search_paths: vec![],
            outline,
            missing: HashSet::new(),
        }
    }

    /// Set search configuration for a new session, forget reported missing files.
    pub fn configure(&mut self, project_root: impl Into<PathBuf>, search_paths: Vec<PathBuf>) {
        self.project_root = project_root.into();
        self.search_paths = search_paths;
        self.missing.clear();
    }

    fn candidate_dirs(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            return vec![self.project_root.clone()];
        }

        self.search_paths
            .iter()
            .flat_map(|path| {
                if path.is_absolute() {
                    vec![path.clone()]
                } else {
                    vec![self.project_root.join(path), path.clone()]
                }
            })
            .collect()
    }

    /// Find a source file in search paths, try exact name first and capitalized name next.
    pub fn find_file(&self, file_name: &str) -> Option<PathBuf> {
        let names = [file_name.to_string(), capitalize(file_name)];
        self.candidate_dirs().into_iter().find_map(|dir| {
            names
                .iter()
                .map(|name| dir.join(name))
                .find(|path| path.is_file())
        })
    }

    /// Return the name of a definition enclosing a line: the last top-level definition that
    /// starts at or before it, one nesting level deep for modules (`Module.fn`).
    pub fn enclosing_function(&self, file: &Path, line: usize) -> Option<String> {
        let definitions = self.outline.definitions(file)?;
        let top = definitions.iter().rev().find(|def| def.line <= line)?;
        match top.children.iter().rev().find(|def| def.line <= line) {
            Some(nested) => Some(format!("{}.{}", top.name, nested.name)),
            None => Some(top.name.clone()),
        }
    }

    /// Resolve a module name and a character offset into a source location.
    pub fn resolve(&self, module: &str, offset: usize) -> Location {
        let file_name = module_file_name(module);
        let path = self.find_file(&file_name);

        let line = path.as_ref().and_then(|p| {
            let source = crate::muted_error!(fs::read_to_string(p))?;
            Some(line_of_offset(&source, offset))
        });
        let function = match (&path, line) {
            (Some(p), Some(line)) => self.enclosing_function(p, line),
            _ => None,
        };

        Location {
            module: module.to_string(),
            file_name,
            path,
            offset,
            line,
            function,
        }
    }

    /// Register a missing file. Return true if the file was not reported during the session.
    pub fn report_missing(&mut self, file_name: &str) -> bool {
        self.missing.insert(file_name.to_string())
    }
}
