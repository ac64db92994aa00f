use anyhow::Context;
use std::path::{Component, Path};
use std::sync::Arc;

use rfx_core::assist::{AssistContext, SharedPreferences};
use rfx_core::validation::Severity;
use rfx_core::version::RobotVersion;

use super::workspace::build_index;
use crate::analyzer::RobotAnalyzer;

const USAGE: &str = "Usage: rfx-lsp --analyze [--errors-only] [--robot-version X.Y] <relative-file-path>\n       rfx-lsp --complete <relative-file-path> <byte-offset>\n  --analyze <file>        : Full analysis with JSON output\n  --errors-only           : Show only errors in simple format\n  --robot-version <X.Y>   : Validate against this Robot Framework version (default 7.0)\n  --complete <file> <n>   : Print the proposals at byte offset n as JSON";

/// Arguments after `start` that are neither flags nor flag values.
fn positionals(args: &[String], start: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--robot-version" => i += 2,
            a if a.starts_with("--") => i += 1,
            a => {
                out.push(a);
                i += 1;
            }
        }
    }
    out
}

fn robot_version(args: &[String]) -> anyhow::Result<RobotVersion> {
    match args.iter().position(|a| a == "--robot-version") {
        Some(i) => {
            let text = args.get(i + 1).ok_or_else(|| anyhow::anyhow!("--robot-version needs a value\n{USAGE}"))?;
            Ok(RobotVersion::parse(text)?)
        }
        None => Ok(RobotVersion::new(7, 0)),
    }
}

pub(crate) fn try_cli() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().collect();
    run_cli(&args)
}

pub(crate) fn run_cli(args: &[String]) -> anyhow::Result<Option<String>> {
    if args.len() <= 1 {
        return Ok(None);
    }

    if let Some(i) = args.iter().position(|a| a == "--analyze") {
        let path = positionals(args, i + 1)
            .first()
            .map(|p| p.to_string())
            .ok_or_else(|| anyhow::anyhow!(USAGE))?;
        let errors_only = args.iter().any(|a| a == "--errors-only");
        let content = read_file_content(&path)?;

        let analyzer = RobotAnalyzer::new(robot_version(args)?);
        let analysis = analyzer.analyze(&path, &content);

        if errors_only {
            let errors: Vec<String> = analysis
                .problems
                .iter()
                .filter(|p| p.severity == Severity::Error)
                .map(|p| format!("Line {}:{}: {}", p.token.line + 1, p.token.column + 1, p.message))
                .collect();
            if errors.is_empty() {
                return Ok(Some("No errors found".to_string()));
            }
            return Ok(Some(errors.join("\n")));
        }

        let output = serde_json::json!({
            "robotVersion": analyzer.version(),
            "diagnostics": analysis.diagnostics,
            "symbols": analysis.symbols,
        });
        return Ok(Some(serde_json::to_string_pretty(&output)?));
    }

    if let Some(i) = args.iter().position(|a| a == "--complete") {
        let rest = positionals(args, i + 1);
        let (Some(path), Some(offset)) = (rest.first(), rest.get(1)) else {
            return Err(anyhow::anyhow!(USAGE));
        };
        let offset: usize = offset
            .parse()
            .with_context(|| format!("Invalid byte offset '{}'", offset))?;
        let content = read_file_content(path)?;

        let index = build_index(Some(Path::new(".")), &[]);
        let context = AssistContext::new(Arc::new(SharedPreferences::default()), Arc::new(index));
        let analyzer = RobotAnalyzer::with_context(robot_version(args)?, Arc::new(context));
        let proposals = analyzer.complete(path, &content, offset.min(content.len()));
        return Ok(Some(serde_json::to_string_pretty(&proposals)?));
    }

    Ok(None)
}

pub(crate) fn is_safe_path(path: &str) -> bool {
    let path = Path::new(path);
    if path.as_os_str().is_empty() || path.is_absolute() {
        return false;
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }
    let s = path.to_string_lossy();
    if s.chars().any(|c| matches!(c, '\0' | '\n' | '\r' | '\t')) {
        return false;
    }
    // Drive-letter paths such as `C:foo`
    !(s.len() >= 2 && s.as_bytes()[1] == b':')
}

pub(crate) fn read_file_content(path: &str) -> anyhow::Result<String> {
    if !is_safe_path(path) {
        return Err(anyhow::anyhow!("Unsafe file path: {}", path));
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("rfx-lsp").chain(list.iter().copied()).map(str::to_string).collect()
    }

    #[test]
    fn test_no_arguments_starts_the_server() {
        assert!(run_cli(&args(&[])).unwrap().is_none());
        assert!(run_cli(&args(&["--stdio"])).unwrap().is_none());
    }

    #[test]
    fn test_positionals_skip_flag_values() {
        let list = args(&["--analyze", "--robot-version", "3.1", "--errors-only", "suite.robot"]);
        assert_eq!(positionals(&list, 2), vec!["suite.robot"]);
        assert_eq!(robot_version(&list).unwrap(), RobotVersion::new(3, 1));
    }

    #[test]
    fn test_unsafe_paths_are_rejected() {
        assert!(is_safe_path("suites/login.robot"));
        assert!(!is_safe_path("/etc/passwd"));
        assert!(!is_safe_path("../outside.robot"));
        assert!(!is_safe_path("C:suite.robot"));
        assert!(!is_safe_path(""));
        assert!(read_file_content("../x.robot").is_err());
    }

    #[test]
    fn test_missing_path_prints_usage() {
        let error = run_cli(&args(&["--analyze"])).unwrap_err();
        assert!(error.to_string().starts_with("Usage: rfx-lsp"));
        let error = run_cli(&args(&["--complete", "suite.robot"])).unwrap_err();
        assert!(error.to_string().contains("--complete"));
    }
}
