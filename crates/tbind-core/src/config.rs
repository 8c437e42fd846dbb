//! Rule configuration: wire-format DTOs and validated domain types.
//!
//! Rules are loaded once at startup from a JSON file, validated into domain
//! types (compiled glob patterns, a parsed rendering strategy), and read-only
//! for the lifetime of a generation pass. Any malformed field is fatal
//! before traversal begins.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Configuration errors. All of these abort the run before any traversal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the rules file.
    #[error("Failed to read rules file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in the rules file.
    #[error("Failed to parse rules: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A file-matching glob failed to compile.
    #[error("{context}: invalid glob pattern `{pattern}`: {source}")]
    InvalidGlob {
        /// Where the error occurred (e.g., "rule #2 files[0]").
        context: String,
        /// The offending pattern.
        pattern: String,
        /// The underlying glob error.
        source: glob::PatternError,
    },

    /// Unknown rendering strategy tag.
    #[error("{context}: unknown output strategy `{value}`, expected: file-per-class, single-file")]
    UnknownStrategy {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// A rule declares no file patterns.
    #[error("{context}: rule must declare at least one file pattern")]
    EmptyFiles {
        /// The rule that has the problem.
        context: String,
    },

    /// A rule declares no outputs.
    #[error("{context}: rule must declare at least one output")]
    EmptyOutputs {
        /// The rule that has the problem.
        context: String,
    },
}

/// Wire format of one rule record in `rules.json`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RuleDto {
    /// Optional human-readable name, used in logs.
    #[serde(default)]
    pub name: Option<String>,

    /// Glob patterns selecting which source files the rule governs.
    #[serde(default)]
    pub files: Vec<String>,

    /// Required base class: the rule applies only to classes deriving
    /// (directly or transitively) from this name.
    #[serde(default)]
    pub base: Option<String>,

    /// Type names whose appearance invalidates a method, and class names
    /// that are refused outright.
    #[serde(default, rename = "excluded-types")]
    pub excluded_types: Vec<String>,

    /// Output targets, in declaration order.
    #[serde(default)]
    pub output: Vec<OutputDto>,
}

/// Wire format of one output record.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OutputDto {
    /// Template file path, relative to the bindings root.
    pub template: String,

    /// Output path: a template over the class for per-class outputs, a
    /// fixed path for batched outputs.
    pub path: String,

    /// Rendering strategy tag.
    pub rule: String,

    /// Type-name remapping table (normalized name → replacement).
    #[serde(default)]
    pub types: HashMap<String, String>,
}

/// Rendering strategy of an output target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Render once per matched class, to a templated path.
    PerClass,
    /// Accumulate classes and render once per rule, to a fixed path.
    Batched,
}

/// A validated output target, owned by exactly one [`Rule`].
#[derive(Debug, Clone)]
pub struct OutputSpec {
    /// Template file path, relative to the bindings root.
    pub template: PathBuf,
    /// Output path pattern (per-class) or fixed output path (batched).
    pub path: String,
    /// Rendering strategy.
    pub strategy: Strategy,
    /// Type-name remapping table consulted before the default casing
    /// transform.
    pub types: HashMap<String, String>,
}

/// A validated matching rule.
///
/// Rules are matched in declaration order; the first rule whose file pattern
/// matches (and whose base-class predicate, if any, is satisfied) wins.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Name used in logs (derived from position if unnamed).
    pub name: String,
    /// Compiled file-matching globs.
    pub files: Vec<glob::Pattern>,
    /// Required (transitive) base class, if any.
    pub base: Option<String>,
    /// Excluded type names.
    pub excluded_types: HashSet<String>,
    /// Output targets in declaration order.
    pub outputs: Vec<OutputSpec>,
}

/// Loads and validates rules from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the JSON is malformed, or
/// any rule fails validation.
pub fn load_rules(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_rules(&content)
}

/// Parses and validates rules from a JSON string.
///
/// # Errors
///
/// Returns the first validation error encountered.
pub fn parse_rules(json: &str) -> Result<Vec<Rule>, ConfigError> {
    let dtos: Vec<RuleDto> = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
        message: e.to_string(),
    })?;

    dtos.into_iter()
        .enumerate()
        .map(|(i, dto)| convert_rule(dto, i))
        .collect()
}

fn convert_rule(dto: RuleDto, index: usize) -> Result<Rule, ConfigError> {
    let name = dto
        .name
        .unwrap_or_else(|| format!("rule #{}", index + 1));

    if dto.files.is_empty() {
        return Err(ConfigError::EmptyFiles {
            context: name.clone(),
        });
    }
    if dto.output.is_empty() {
        return Err(ConfigError::EmptyOutputs {
            context: name.clone(),
        });
    }

    let files = dto
        .files
        .iter()
        .enumerate()
        .map(|(j, p)| {
            glob::Pattern::new(p).map_err(|e| ConfigError::InvalidGlob {
                context: format!("{name} files[{j}]"),
                pattern: p.clone(),
                source: e,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let outputs = dto
        .output
        .into_iter()
        .enumerate()
        .map(|(j, o)| convert_output(o, &name, j))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Rule {
        name,
        files,
        base: dto.base,
        excluded_types: dto.excluded_types.into_iter().collect(),
        outputs,
    })
}

fn convert_output(dto: OutputDto, rule_name: &str, index: usize) -> Result<OutputSpec, ConfigError> {
    let strategy = match dto.rule.as_str() {
        "file-per-class" | "per-class" => Strategy::PerClass,
        "single-file" | "batched" => Strategy::Batched,
        other => {
            return Err(ConfigError::UnknownStrategy {
                context: format!("{rule_name} output[{index}]"),
                value: other.to_string(),
            })
        }
    };

    Ok(OutputSpec {
        template: PathBuf::from(dto.template),
        path: dto.path,
        strategy,
        types: dto.types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Happy path --

    #[test]
    fn parse_empty_rule_list() {
        let rules = parse_rules("[]").unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn parse_full_rule() {
        let rules = parse_rules(
            r#"[
                {
                    "name": "widgets",
                    "files": ["**/widgets/*.h"],
                    "base": "Object",
                    "excluded-types": ["Variant"],
                    "output": [
                        {
                            "template": "templates/class.h.tpl",
                            "path": "generated/{{class_name}}.h",
                            "rule": "file-per-class",
                            "types": {"int": "Int32"}
                        },
                        {
                            "template": "templates/registry.cpp.tpl",
                            "path": "generated/registry.cpp",
                            "rule": "single-file"
                        }
                    ]
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.name, "widgets");
        assert_eq!(rule.base.as_deref(), Some("Object"));
        assert!(rule.excluded_types.contains("Variant"));
        assert_eq!(rule.outputs.len(), 2);
        assert_eq!(rule.outputs[0].strategy, Strategy::PerClass);
        assert_eq!(rule.outputs[1].strategy, Strategy::Batched);
        assert_eq!(rule.outputs[0].types.get("int").map(String::as_str), Some("Int32"));
    }

    #[test]
    fn unnamed_rules_get_positional_names() {
        let rules = parse_rules(
            r#"[{"files": ["*.h"], "output": [{"template": "t", "path": "p", "rule": "single-file"}]}]"#,
        )
        .unwrap();
        assert_eq!(rules[0].name, "rule #1");
    }

    // -- Error cases --

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_rules("not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_rule_without_files() {
        let result = parse_rules(
            r#"[{"output": [{"template": "t", "path": "p", "rule": "single-file"}]}]"#,
        );
        assert!(matches!(result, Err(ConfigError::EmptyFiles { .. })));
    }

    #[test]
    fn rejects_rule_without_outputs() {
        let result = parse_rules(r#"[{"files": ["*.h"]}]"#);
        assert!(matches!(result, Err(ConfigError::EmptyOutputs { .. })));
    }

    #[test]
    fn rejects_unknown_strategy() {
        let result = parse_rules(
            r#"[{"files": ["*.h"], "output": [{"template": "t", "path": "p", "rule": "zip"}]}]"#,
        );
        assert!(matches!(result, Err(ConfigError::UnknownStrategy { .. })));
    }

    #[test]
    fn rejects_invalid_glob() {
        let result = parse_rules(
            r#"[{"files": ["[oops"], "output": [{"template": "t", "path": "p", "rule": "single-file"}]}]"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidGlob { .. })));
    }
}
