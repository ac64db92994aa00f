//! Keyword, library, resource and variable lookups a suite can see.

use serde::{Deserialize, Serialize};

use crate::model::{ImportKind, SuiteDocument, UserKeyword, normalize};
use crate::util::fast_map::{FastHashMap, FastHashSet, fast_hash_set_new};

/// Library every suite sees without importing it.
pub const BUILTIN_LIBRARY: &str = "BuiltIn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeywordScope {
    Local,
    Resource,
    Library,
    /// Library known to the project but not imported by the suite
    NotImportedLibrary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArgumentKind {
    Required,
    Optional,
    Varargs,
    Kwargs,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub kind: ArgumentKind,
}

impl ArgumentDescriptor {
    /// Accepts both user keyword (`${a}`, `${b}=x`, `@{c}`, `&{d}`) and library
    /// (`a`, `b=x`, `*c`, `**d`) notation.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (head, has_default) = match text.split_once('=') {
            Some((head, _)) => (head.trim(), true),
            None => (text, false),
        };
        let (name, kind) = if let Some(rest) = head.strip_prefix("**") {
            (rest, ArgumentKind::Kwargs)
        } else if let Some(rest) = head.strip_prefix('*') {
            (rest, ArgumentKind::Varargs)
        } else if head.starts_with("@{") {
            (head, ArgumentKind::Varargs)
        } else if head.starts_with("&{") {
            (head, ArgumentKind::Kwargs)
        } else if has_default {
            (head, ArgumentKind::Optional)
        } else {
            (head, ArgumentKind::Required)
        };
        Self {
            name: name.to_string(),
            kind,
        }
    }

    /// Name shown as placeholder: `${arg}` becomes `arg`.
    pub fn placeholder(&self) -> String {
        match crate::model::variable::parse_variable(&self.name) {
            Some((_, inner)) => inner.to_string(),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntity {
    pub name: String,
    /// Library name, resource base name or the suite file name.
    pub source: String,
    pub scope: KeywordScope,
    #[serde(default)]
    pub arguments: Vec<ArgumentDescriptor>,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl KeywordEntity {
    pub fn new(name: impl Into<String>, source: impl Into<String>, scope: KeywordScope) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            scope,
            arguments: Vec::new(),
            documentation: None,
        }
    }

    pub fn with_arguments<S: AsRef<str>>(mut self, args: &[S]) -> Self {
        self.arguments = args.iter().map(|a| ArgumentDescriptor::parse(a.as_ref())).collect();
        self
    }

    pub fn with_documentation(mut self, doc: impl Into<String>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    pub fn required_arguments(&self) -> Vec<String> {
        self.arguments
            .iter()
            .filter(|a| a.kind == ArgumentKind::Required)
            .map(ArgumentDescriptor::placeholder)
            .collect()
    }

    pub fn has_embedded_arguments(&self) -> bool {
        self.name.contains("${")
    }

    /// Argument signature for secondary info, e.g. `name, value=None, *rest`.
    pub fn signature(&self) -> String {
        self.arguments.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
    }

    fn from_user_keyword(keyword: &UserKeyword, source: &str, scope: KeywordScope) -> Self {
        let args: Vec<&str> = keyword.arguments().iter().map(|t| t.text.as_str()).collect();
        Self::new(keyword.name.text.trim(), source, scope).with_arguments(&args)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySpec {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<KeywordEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub path: String,
    #[serde(default)]
    pub keywords: Vec<KeywordEntity>,
    #[serde(default)]
    pub variables: Vec<String>,
}

/// Read-only semantic lookups shared by every document.
pub trait ProjectIndex: Send + Sync {
    /// Every library the project can import, sorted.
    fn library_names(&self) -> Vec<String>;
    fn library(&self, name: &str) -> Option<LibrarySpec>;
    /// Resource file paths, relative to the project root.
    fn resource_paths(&self) -> Vec<String>;
    fn resource(&self, path: &str) -> Option<ResourceSpec>;
    /// Variable file paths, relative to the project root.
    fn variable_file_paths(&self) -> Vec<String>;
    fn variable_file(&self, path: &str) -> Option<Vec<String>>;
}

/// In-memory index built up front; the server rebuilds it from the workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticProjectIndex {
    #[serde(default)]
    libraries: FastHashMap<String, LibrarySpec>,
    #[serde(default)]
    resources: FastHashMap<String, ResourceSpec>,
    #[serde(default)]
    variable_files: FastHashMap<String, Vec<String>>,
}

impl StaticProjectIndex {
    pub fn with_library(mut self, name: &str, keywords: Vec<KeywordEntity>) -> Self {
        self.add_library(name, keywords);
        self
    }

    pub fn add_library(&mut self, name: &str, keywords: Vec<KeywordEntity>) {
        let keywords = keywords
            .into_iter()
            .map(|k| KeywordEntity {
                source: name.to_string(),
                scope: KeywordScope::Library,
                ..k
            })
            .collect();
        self.libraries.insert(
            normalize(name),
            LibrarySpec {
                name: name.to_string(),
                keywords,
            },
        );
    }

    pub fn with_resource(mut self, path: &str, keywords: Vec<KeywordEntity>, variables: Vec<String>) -> Self {
        self.resources.insert(
            normalize_path(path),
            ResourceSpec {
                path: normalize_path(path),
                keywords,
                variables,
            },
        );
        self
    }

    /// Indexes the keywords and variables of a parsed resource file.
    pub fn add_resource_document(&mut self, path: &str, document: &SuiteDocument) {
        let source = base_name(path);
        let keywords = document
            .model
            .keywords
            .iter()
            .map(|k| KeywordEntity::from_user_keyword(k, &source, KeywordScope::Resource))
            .collect();
        let variables = document.model.variables.iter().filter_map(|v| v.reference()).collect();
        let path = normalize_path(path);
        self.resources.insert(
            path.clone(),
            ResourceSpec {
                path,
                keywords,
                variables,
            },
        );
    }

    pub fn with_variable_file(mut self, path: &str, variables: Vec<String>) -> Self {
        self.variable_files.insert(normalize_path(path), variables);
        self
    }

    pub fn add_variable_file(&mut self, path: &str, variables: Vec<String>) {
        self.variable_files.insert(normalize_path(path), variables);
    }
}

impl ProjectIndex for StaticProjectIndex {
    fn library_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.libraries.values().map(|l| l.name.clone()).collect();
        names.sort();
        names
    }

    fn library(&self, name: &str) -> Option<LibrarySpec> {
        self.libraries.get(&normalize(name)).cloned()
    }

    fn resource_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.resources.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn resource(&self, path: &str) -> Option<ResourceSpec> {
        self.resources.get(&normalize_path(path)).cloned()
    }

    fn variable_file_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.variable_files.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn variable_file(&self, path: &str) -> Option<Vec<String>> {
        self.variable_files.get(&normalize_path(path)).cloned()
    }
}

/// Forward slashes, no `.` segments, `..` folded where possible.
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." if parts.last().is_some_and(|p| *p != "..") => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    parts.join("/")
}

fn parent_dir(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(i) => &path[..i],
        None => "",
    }
}

/// Resolves an import path written in `from_file` to a project path.
pub fn resolve_import(from_file: &str, import: &str) -> String {
    let dir = parent_dir(from_file);
    if dir.is_empty() {
        normalize_path(import)
    } else {
        normalize_path(&format!("{dir}/{import}"))
    }
}

/// Writes `target` (a project path) relative to the directory of `from_file`.
pub fn relative_path(from_file: &str, target: &str) -> String {
    let from_dir = normalize_path(parent_dir(from_file));
    let target = normalize_path(target);
    let from: Vec<&str> = from_dir.split('/').filter(|p| !p.is_empty()).collect();
    let to: Vec<&str> = target.split('/').collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

/// File name without directories and extension.
pub fn base_name(path: &str) -> String {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    file.split('.').next().unwrap_or(file).to_string()
}

/// Every keyword a suite can call: its own, those of imported resources, of
/// imported libraries and `BuiltIn`, and optionally of libraries it does not import.
pub fn visible_keywords(document: &SuiteDocument, index: &dyn ProjectIndex, include_not_imported: bool) -> Vec<KeywordEntity> {
    let mut keywords: Vec<KeywordEntity> = Vec::new();
    let own_source = base_name(&document.path);
    keywords.extend(
        document
            .model
            .keywords
            .iter()
            .map(|k| KeywordEntity::from_user_keyword(k, &own_source, KeywordScope::Local)),
    );

    let mut imported: FastHashSet<String> = fast_hash_set_new();
    for import in &document.model.imports {
        let Some(name) = import.name.as_ref() else {
            continue;
        };
        match import.kind {
            ImportKind::Resource => {
                let path = resolve_import(&document.path, &name.text);
                if let Some(resource) = index.resource(&path) {
                    let source = import.qualifier().unwrap_or_else(|| base_name(&path));
                    keywords.extend(resource.keywords.into_iter().map(|k| KeywordEntity {
                        source: source.clone(),
                        scope: KeywordScope::Resource,
                        ..k
                    }));
                }
            }
            ImportKind::Library => {
                imported.insert(normalize(&name.text));
                if let Some(library) = index.library(&name.text) {
                    let source = import.qualifier().unwrap_or_else(|| library.name.clone());
                    keywords.extend(library.keywords.into_iter().map(|k| KeywordEntity {
                        source: source.clone(),
                        scope: KeywordScope::Library,
                        ..k
                    }));
                }
            }
            ImportKind::Variables => {}
        }
    }

    if imported.insert(normalize(BUILTIN_LIBRARY)) {
        if let Some(builtin) = index.library(BUILTIN_LIBRARY) {
            keywords.extend(builtin.keywords);
        }
    }

    if include_not_imported {
        for name in index.library_names() {
            if imported.contains(&normalize(&name)) {
                continue;
            }
            if let Some(library) = index.library(&name) {
                keywords.extend(library.keywords.into_iter().map(|k| KeywordEntity {
                    scope: KeywordScope::NotImportedLibrary,
                    ..k
                }));
            }
        }
    }
    keywords
}

/// Variables a suite sees through its resource and variables imports.
pub fn imported_variables(document: &SuiteDocument, index: &dyn ProjectIndex) -> Vec<String> {
    let mut variables = Vec::new();
    for import in &document.model.imports {
        let Some(name) = import.name.as_ref() else {
            continue;
        };
        let path = resolve_import(&document.path, &name.text);
        match import.kind {
            ImportKind::Resource => {
                if let Some(resource) = index.resource(&path) {
                    variables.extend(resource.variables);
                }
            }
            ImportKind::Variables => {
                if let Some(vars) = index.variable_file(&path) {
                    variables.extend(vars);
                }
            }
            ImportKind::Library => {}
        }
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> StaticProjectIndex {
        StaticProjectIndex::default()
            .with_library(
                BUILTIN_LIBRARY,
                vec![KeywordEntity::new("Log", "", KeywordScope::Library).with_arguments(&["message", "level=INFO"])],
            )
            .with_library(
                "Collections",
                vec![KeywordEntity::new("Append To List", "", KeywordScope::Library).with_arguments(&["list_", "*values"])],
            )
            .with_library("String", vec![KeywordEntity::new("Split String", "", KeywordScope::Library)])
            .with_resource(
                "res/common.robot",
                vec![KeywordEntity::new("Common Step", "common", KeywordScope::Resource)],
                vec!["${HOST}".to_string()],
            )
    }

    #[test]
    fn test_argument_parsing() {
        assert_eq!(ArgumentDescriptor::parse("${a}").kind, ArgumentKind::Required);
        assert_eq!(ArgumentDescriptor::parse("${a}=1").kind, ArgumentKind::Optional);
        assert_eq!(ArgumentDescriptor::parse("@{a}").kind, ArgumentKind::Varargs);
        assert_eq!(ArgumentDescriptor::parse("**kw").kind, ArgumentKind::Kwargs);
        assert_eq!(ArgumentDescriptor::parse("${name}").placeholder(), "name");
        assert_eq!(ArgumentDescriptor::parse("level=INFO").name, "level");
    }

    #[test]
    fn test_paths() {
        assert_eq!(normalize_path("./a/b/../c.robot"), "a/c.robot");
        assert_eq!(resolve_import("suites/s.robot", "../res/common.robot"), "res/common.robot");
        assert_eq!(relative_path("suites/s.robot", "res/common.robot"), "../res/common.robot");
        assert_eq!(relative_path("s.robot", "res/common.robot"), "res/common.robot");
        assert_eq!(base_name("res/common.robot"), "common");
    }

    #[test]
    fn test_visible_keywords_by_scope() {
        let doc = SuiteDocument::from_lines(
            "suites/s.robot",
            &[
                "*** Settings ***",
                "Library  Collections  WITH NAME  Col",
                "Resource  ../res/common.robot",
                "*** Keywords ***",
                "Own",
                "  [Arguments]  ${x}",
                "  Log  ${x}",
            ],
        );
        let index = index();
        let keywords = visible_keywords(&doc, &index, false);
        let find = |name: &str| keywords.iter().find(|k| k.name == name).cloned();
        assert_eq!(find("Own").map(|k| k.scope), Some(KeywordScope::Local));
        assert_eq!(find("Own").map(|k| k.required_arguments()), Some(vec!["x".to_string()]));
        assert_eq!(find("Append To List").map(|k| k.source), Some("Col".to_string()));
        assert_eq!(find("Common Step").map(|k| k.scope), Some(KeywordScope::Resource));
        assert!(find("Log").is_some(), "BuiltIn is always visible");
        assert!(find("Split String").is_none());

        let all = visible_keywords(&doc, &index, true);
        let split = all.iter().find(|k| k.name == "Split String");
        assert_eq!(split.map(|k| k.scope), Some(KeywordScope::NotImportedLibrary));
        assert_eq!(imported_variables(&doc, &index), vec!["${HOST}".to_string()]);
    }
}
