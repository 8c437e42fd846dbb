//! Generation engine: the traversal driver and output dispatcher.
//!
//! One rule is fully processed (traversal, extraction, rendering) before the
//! next begins. Within a rule pass the engine walks the tree depth-first in
//! pre-order, extracts matched classes, and routes each finalized class to
//! the rule's outputs: per-class outputs render immediately, batched outputs
//! accumulate and render exactly once after the traversal completes.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::ast::{Node, NodeKind};
use crate::builder::build_class;
use crate::config::{Rule, Strategy};
use crate::matcher::{match_rule, DeclIndex};
use crate::model::{ClassRegistry, Extraction};
use crate::render::{class_context, extraction_context, Renderer};
use crate::resolver::{resolve_names, ResolveError};

/// Errors that can occur during generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A template file could not be read.
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        /// Template path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A template file could not be parsed.
    #[error("Failed to parse template {path}: {message}")]
    TemplateParse {
        /// Template path.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Rendering a template or path pattern failed.
    #[error("Failed to render {name}: {source}")]
    Render {
        /// What was being rendered.
        name: String,
        /// Underlying render error.
        source: Box<handlebars::RenderError>,
    },

    /// An output file or its directory could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Name resolution hit an internal-consistency failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Summary of one generation run.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenerateReport {
    /// Classes extracted across all rules.
    pub classes_extracted: usize,
    /// Files written (per-class and batched).
    pub files_written: usize,
}

/// Builder for configuring a [`Generator`].
#[derive(Default)]
pub struct GeneratorBuilder {
    root: Option<PathBuf>,
    rules: Vec<Rule>,
}

impl GeneratorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bindings root directory; templates and output paths resolve
    /// against it.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the rules to process, in declaration order.
    #[must_use]
    pub fn rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    /// Appends one rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Builds the generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is needed to absolutize the
    /// root but cannot be determined.
    pub fn build(self) -> Result<Generator, GenerateError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(root)
        };

        Ok(Generator {
            root,
            rules: self.rules,
        })
    }
}

/// The generation engine. Use [`Generator::builder()`] to construct one.
pub struct Generator {
    root: PathBuf,
    rules: Vec<Rule>,
}

impl Generator {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    /// Returns the bindings root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of configured rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Processes every rule against the parsed tree and writes all outputs.
    ///
    /// # Errors
    ///
    /// Returns an error on template, rendering, filesystem, or name
    /// resolution failures. Rule non-matches and excluded declarations are
    /// not errors.
    pub fn generate(&self, unit: &Node) -> Result<GenerateReport, GenerateError> {
        info!("Starting generation into {:?}", self.root);

        let index = DeclIndex::build(unit);
        let mut report = GenerateReport::default();

        for (rule_index, rule) in self.rules.iter().enumerate() {
            info!("Processing rule #{} ({})", rule_index + 1, rule.name);
            let mut pass = RulePass::prepare(&self.root, rule)?;
            self.visit(unit, rule_index, &index, &mut pass, &mut report)?;
            pass.finish(&self.root, rule, &mut report)?;
        }

        info!(
            "Generation complete: {} class(es), {} file(s)",
            report.classes_extracted, report.files_written
        );
        Ok(report)
    }

    /// Depth-first pre-order walk. Recursion into children is never
    /// suppressed; nested declarations are visited independently.
    fn visit(
        &self,
        node: &Node,
        rule_index: usize,
        index: &DeclIndex<'_>,
        pass: &mut RulePass,
        report: &mut GenerateReport,
    ) -> Result<(), GenerateError> {
        if let Some((matched, rule)) = match_rule(&self.rules, node, index) {
            if matched == rule_index && node.kind == NodeKind::Class {
                self.extract_class(node, rule, pass, report)?;
            }
        }

        for child in &node.children {
            self.visit(child, rule_index, index, pass, report)?;
        }
        Ok(())
    }

    /// Runs model building, name resolution, and output dispatch for one
    /// matched class declaration.
    fn extract_class(
        &self,
        node: &Node,
        rule: &Rule,
        pass: &mut RulePass,
        report: &mut GenerateReport,
    ) -> Result<(), GenerateError> {
        let Some(id) = build_class(node, rule, &mut pass.registry) else {
            debug!("Refusing excluded class `{}`", node.spelling);
            return Ok(());
        };
        resolve_names(&mut pass.registry, id)?;
        report.classes_extracted += 1;
        debug!("Extracted class `{}`", node.spelling);

        for (output_index, output) in rule.outputs.iter().enumerate() {
            match output.strategy {
                Strategy::PerClass => {
                    let ctx = class_context(pass.registry.get(id), &output.types);
                    let relative = pass
                        .renderer
                        .render_inline(&output.path, &ctx)
                        .map_err(|e| GenerateError::Render {
                            name: format!("path pattern `{}`", output.path),
                            source: Box::new(e),
                        })?;
                    let rendered = pass
                        .renderer
                        .render(&template_name(output_index), &ctx)
                        .map_err(|e| GenerateError::Render {
                            name: output.template.display().to_string(),
                            source: Box::new(e),
                        })?;
                    let path = self.root.join(relative);
                    write_file(&path, &rendered)?;
                    report.files_written += 1;
                    debug!("Wrote {}", path.display());
                }
                Strategy::Batched => pass.extractions[output_index].add(id),
            }
        }
        Ok(())
    }
}

/// Per-rule working state: a fresh renderer with the rule's templates
/// registered, a fresh class registry, and one extraction per output.
struct RulePass {
    renderer: Renderer,
    registry: ClassRegistry,
    extractions: Vec<Extraction>,
}

impl RulePass {
    /// Loads and parses the rule's templates. Any failure here is fatal
    /// before traversal begins.
    fn prepare(root: &Path, rule: &Rule) -> Result<Self, GenerateError> {
        let mut renderer = Renderer::new();
        for (output_index, output) in rule.outputs.iter().enumerate() {
            let path = root.join(&output.template);
            let source =
                std::fs::read_to_string(&path).map_err(|e| GenerateError::TemplateRead {
                    path: path.clone(),
                    source: e,
                })?;
            renderer
                .register_template(&template_name(output_index), &source)
                .map_err(|e| GenerateError::TemplateParse {
                    path,
                    message: e.to_string(),
                })?;
        }

        Ok(Self {
            renderer,
            registry: ClassRegistry::new(),
            extractions: rule.outputs.iter().map(|_| Extraction::new()).collect(),
        })
    }

    /// Renders every batched output once, in output declaration order. A
    /// batched output renders even when no class matched.
    fn finish(
        &self,
        root: &Path,
        rule: &Rule,
        report: &mut GenerateReport,
    ) -> Result<(), GenerateError> {
        for (output_index, output) in rule.outputs.iter().enumerate() {
            if output.strategy != Strategy::Batched {
                continue;
            }
            let ctx = extraction_context(&self.extractions[output_index], &self.registry, &output.types);
            let rendered = self
                .renderer
                .render(&template_name(output_index), &ctx)
                .map_err(|e| GenerateError::Render {
                    name: output.template.display().to_string(),
                    source: Box::new(e),
                })?;
            let path = root.join(&output.path);
            write_file(&path, &rendered)?;
            report.files_written += 1;
            debug!("Wrote batched output {}", path.display());
        }
        Ok(())
    }
}

fn template_name(output_index: usize) -> String {
    format!("output{output_index}")
}

/// Creates the containing directory if needed, then writes with
/// create-or-truncate semantics. Regeneration is idempotent, so a failed
/// partial write is recovered by the next run.
fn write_file(path: &Path, contents: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenerateError::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, contents).map_err(|e| GenerateError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
