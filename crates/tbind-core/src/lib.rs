//! # tbind-core
//!
//! Core engine for rule-driven source-to-source binding generation.
//!
//! The engine walks a parsed AST of a native object-oriented codebase,
//! selects classes and public methods according to declarative rules, builds
//! a normalized intermediate model, resolves name collisions introduced by
//! inheritance and overloading, and renders each class (or a batch of
//! classes) through user-supplied templates.
//!
//! The native-language parser is an external collaborator: it hands the core
//! a read-only tree of [`ast::Node`]s (typically as a JSON dump) and the core
//! performs only structural queries against it.
//!
//! ## Example
//!
//! ```ignore
//! use tbind_core::{ast::Node, load_rules, Generator};
//!
//! let rules = load_rules(Path::new("rules.json"))?;
//! let unit = Node::from_json(&std::fs::read_to_string("ast.json")?)?;
//!
//! let generator = Generator::builder()
//!     .root("./bindings")
//!     .rules(rules)
//!     .build()?;
//!
//! let report = generator.generate(&unit)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;

mod builder;
mod config;
mod engine;
mod matcher;
mod model;
mod render;
mod resolver;

pub use builder::build_class;
pub use config::{load_rules, parse_rules, ConfigError, OutputSpec, Rule, Strategy};
pub use engine::{GenerateError, GenerateReport, Generator, GeneratorBuilder};
pub use matcher::{match_rule, DeclIndex};
pub use model::{Argument, Class, ClassId, ClassRegistry, Extraction, Method};
pub use render::{class_context, extraction_context, Renderer};
pub use resolver::{resolve_names, ResolveError, MAX_SUFFIX_ATTEMPTS};
