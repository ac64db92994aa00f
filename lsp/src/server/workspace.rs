//! Builds the project index the assist providers read: resource files and
//! variable files found under the workspace root, plus library documentation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use rfx_core::assist::index::{KeywordEntity, KeywordScope, BUILTIN_LIBRARY};
use rfx_core::assist::StaticProjectIndex;
use rfx_core::model::{FileKind, SuiteDocument};
use serde::Deserialize;
use tracing::{debug, warn};

use super::utils::project_relative;

const SUITE_EXTENSIONS: &[&str] = &["robot", "resource", "txt", "tsv"];
const VARIABLE_EXTENSIONS: &[&str] = &["py", "yaml", "yml", "json"];
const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "__pycache__", "venv", "results"];
const MAX_FILES: usize = 5000;

/// Keywords of `BuiltIn` offered when no library documentation overrides them.
const BUILTIN_KEYWORDS: &[(&str, &[&str], &str)] = &[
    ("Catenate", &["*items"], "Catenates the given items together and returns the resulted string."),
    ("Evaluate", &["expression", "modules=None", "namespace=None"], "Evaluates the given expression in Python and returns the result."),
    ("Fail", &["msg=None", "*tags"], "Fails the test with the given message and optionally alters its tags."),
    ("Get Count", &["container", "item"], "Returns and logs how many times item is found from container."),
    ("Get Length", &["item"], "Returns and logs the length of the given item as an integer."),
    ("Log", &["message", "level=INFO", "html=False", "console=False"], "Logs the given message with the given level."),
    ("Log To Console", &["message", "stream=STDOUT", "no_newline=False"], "Logs the given message to the console."),
    ("No Operation", &[], "Does absolutely nothing."),
    ("Run Keyword", &["name", "*args"], "Executes the given keyword with the given arguments."),
    ("Run Keyword If", &["condition", "name", "*args"], "Runs the given keyword with the given arguments, if condition is true."),
    ("Set Suite Variable", &["name", "*values"], "Makes a variable available everywhere within the scope of the current suite."),
    ("Set Test Variable", &["name", "*values"], "Makes a variable available everywhere within the scope of the current test."),
    ("Set Variable", &["*values"], "Returns the given values which can then be assigned to a variables."),
    ("Should Be Equal", &["first", "second", "msg=None", "values=True"], "Fails if the given objects are unequal."),
    ("Should Be True", &["condition", "msg=None"], "Fails if the given condition is not true."),
    ("Should Contain", &["container", "item", "msg=None"], "Fails if container does not contain item one or more times."),
    ("Sleep", &["time", "reason=None"], "Pauses the test executed for the given time."),
];

static PY_ASSIGNMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\s*=[^=]").ok());

/// Library documentation in the shape `libdoc --format json` writes.
#[derive(Debug, Deserialize)]
struct LibraryDoc {
    name: String,
    #[serde(default)]
    keywords: Vec<KeywordDoc>,
}

#[derive(Debug, Deserialize)]
struct KeywordDoc {
    name: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    doc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LibraryDocFile {
    One(LibraryDoc),
    Many(Vec<LibraryDoc>),
}

pub(crate) fn builtin_keywords() -> Vec<KeywordEntity> {
    BUILTIN_KEYWORDS
        .iter()
        .map(|(name, args, doc)| {
            KeywordEntity::new(*name, BUILTIN_LIBRARY, KeywordScope::Library)
                .with_arguments(args)
                .with_documentation(*doc)
        })
        .collect()
}

pub(crate) fn load_library_docs(path: &Path) -> anyhow::Result<Vec<(String, Vec<KeywordEntity>)>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read library docs '{}'", path.display()))?;
    let parsed: LibraryDocFile =
        serde_json::from_str(&content).with_context(|| format!("Invalid library docs in '{}'", path.display()))?;
    let docs = match parsed {
        LibraryDocFile::One(doc) => vec![doc],
        LibraryDocFile::Many(docs) => docs,
    };
    Ok(docs
        .into_iter()
        .map(|lib| {
            let keywords = lib
                .keywords
                .into_iter()
                .map(|k| {
                    let entity = KeywordEntity::new(k.name, lib.name.as_str(), KeywordScope::Library).with_arguments(&k.args);
                    match k.doc {
                        Some(doc) => entity.with_documentation(doc),
                        None => entity,
                    }
                })
                .collect();
            (lib.name, keywords)
        })
        .collect())
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// `LIST__` and `DICT__` prefixes turn a variable-file name into a list or dictionary.
fn variable_name(name: &str) -> String {
    if let Some(rest) = name.strip_prefix("LIST__") {
        format!("@{{{rest}}}")
    } else if let Some(rest) = name.strip_prefix("DICT__") {
        format!("&{{{rest}}}")
    } else {
        format!("${{{name}}}")
    }
}

/// Variables a variable file defines, in `${name}` form.
pub(crate) fn variables_in_file(path: &Path, content: &str) -> Vec<String> {
    let mut names: Vec<String> = match extension(path).as_str() {
        "py" => {
            let Some(re) = PY_ASSIGNMENT.as_ref() else {
                return Vec::new();
            };
            content
                .lines()
                .filter_map(|line| re.captures(line))
                .filter_map(|caps| caps.get(1).map(|m| variable_name(m.as_str())))
                .collect()
        }
        "yaml" | "yml" => match serde_yaml::from_str::<serde_yaml::Mapping>(content) {
            Ok(map) => map.keys().filter_map(|k| k.as_str()).map(variable_name).collect(),
            Err(e) => {
                debug!(path = %path.display(), "unreadable yaml variable file: {e}");
                Vec::new()
            }
        },
        "json" => serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(content)
            .map(|map| map.keys().map(|k| variable_name(k)).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    names.dedup();
    names
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        if out.len() >= MAX_FILES {
            return;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if !SKIPPED_DIRS.contains(&name.as_str()) {
                collect_files(&path, out);
            }
        } else {
            let ext = extension(&path);
            if SUITE_EXTENSIONS.contains(&ext.as_str()) || VARIABLE_EXTENSIONS.contains(&ext.as_str()) {
                out.push(path);
            }
        }
    }
}

/// Scans `root` and loads `library_docs`. Unreadable files are skipped.
pub(crate) fn build_index(root: Option<&Path>, library_docs: &[PathBuf]) -> StaticProjectIndex {
    let mut index = StaticProjectIndex::default();
    index.add_library(BUILTIN_LIBRARY, builtin_keywords());
    for path in library_docs {
        match load_library_docs(path) {
            Ok(libraries) => {
                for (name, keywords) in libraries {
                    index.add_library(&name, keywords);
                }
            }
            Err(e) => warn!("{e:#}"),
        }
    }

    let Some(root) = root else {
        return index;
    };
    let mut files = Vec::new();
    collect_files(root, &mut files);
    let (mut resources, mut variable_files) = (0usize, 0usize);
    for file in files {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        let relative = project_relative(Some(root), &file);
        if SUITE_EXTENSIONS.contains(&extension(&file).as_str()) {
            let document = SuiteDocument::new(relative.as_str(), content);
            if document.kind() == FileKind::Resource {
                index.add_resource_document(&relative, &document);
                resources += 1;
            }
        } else {
            index.add_variable_file(&relative, variables_in_file(&file, &content));
            variable_files += 1;
        }
    }
    debug!(root = %root.display(), resources, variable_files, "workspace indexed");
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfx_core::assist::ProjectIndex;

    #[test]
    fn test_build_index_from_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("resources")).unwrap();
        fs::write(
            root.join("resources/common.resource"),
            "*** Variables ***\n${HOST}  localhost\n*** Keywords ***\nOpen Page\n  [Arguments]  ${url}\n  Log  ${url}\n",
        )
        .unwrap();
        fs::write(root.join("login.robot"), "*** Test Cases ***\nLogin\n  Open Page  /\n").unwrap();
        fs::write(root.join("vars.py"), "USER = 'admin'\nLIST__ROLES = ['a']\n_private = 1\n").unwrap();

        let index = build_index(Some(root), &[]);
        let resource = index.resource("resources/common.resource").expect("resource indexed");
        assert_eq!(resource.keywords[0].name, "Open Page");
        assert_eq!(resource.variables, vec!["${HOST}".to_string()]);
        assert!(index.resource("login.robot").is_none(), "suites are not resources");
        assert_eq!(
            index.variable_file("vars.py"),
            Some(vec!["${USER}".to_string(), "@{ROLES}".to_string()])
        );
        assert!(index.library(BUILTIN_LIBRARY).is_some());
    }

    #[test]
    fn test_library_docs_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Collections.json");
        fs::write(
            &path,
            r#"{"name": "Collections", "keywords": [{"name": "Append To List", "args": ["list_", "*values"], "doc": "Adds values."}]}"#,
        )
        .unwrap();

        let index = build_index(None, &[path, dir.path().join("missing.json")]);
        let library = index.library("collections").expect("loaded");
        assert_eq!(library.keywords[0].required_arguments(), vec!["list_".to_string()]);
        assert_eq!(library.keywords[0].documentation.as_deref(), Some("Adds values."));
    }

    #[test]
    fn test_yaml_and_json_variables() {
        let yaml = variables_in_file(Path::new("vars.yaml"), "server:\n  nested: y\nport: 1\n");
        assert_eq!(yaml, vec!["${server}".to_string(), "${port}".to_string()]);
        let json = variables_in_file(Path::new("vars.json"), r#"{"a": 1}"#);
        assert_eq!(json, vec!["${a}".to_string()]);
        assert!(variables_in_file(Path::new("vars.json"), "not json").is_empty());
    }

    #[test]
    fn test_yaml_keys_quoted_and_prefixed() {
        let content = "\"quoted key\": 1\n'single': 2\nLIST__items:\n  - a\n  - b\nDICT__opts: {a: 1}\n3: skipped\nafter: |\n  text: not a key\n";
        let names = variables_in_file(Path::new("vars.yml"), content);
        assert_eq!(names, vec!["${quoted key}", "${single}", "@{items}", "&{opts}", "${after}"]);
        assert!(variables_in_file(Path::new("vars.yaml"), "- only\n- a list\n").is_empty());
    }
}
