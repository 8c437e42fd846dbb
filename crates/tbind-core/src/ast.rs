//! Interface boundary with the AST parser collaborator.
//!
//! The core does not parse native source itself. A frontend (a libclang dump
//! tool, a tree-sitter adapter, ...) produces a tree of [`Node`]s, typically
//! serialized as JSON, and the engine consumes it read-only. Nodes expose
//! only structural facts: kind, spelling, source file, access specifier,
//! qualifiers, type introspection, and children.

use serde::Deserialize;
use std::path::PathBuf;

/// Kind of a parsed declaration node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Root of the parsed tree.
    TranslationUnit,
    /// A namespace or module grouping.
    Namespace,
    /// A class (or class-like type) declaration.
    Class,
    /// A member function declaration.
    Method,
    /// A function parameter declaration.
    Param,
    /// A base-class specifier; `spelling` names the referenced base.
    Base,
    /// Any node kind the core has no use for.
    #[serde(other)]
    Other,
}

/// Access specifier of a class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Publicly accessible.
    #[default]
    Public,
    /// Accessible to subclasses only.
    Protected,
    /// Private to the declaring class.
    Private,
}

/// A type as reported by the parser.
///
/// Carries just enough introspection for normalization: the raw spelling,
/// the declared type name behind it (if the parser resolved one), and the
/// pointee for pointer/reference-like types.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TypeRef {
    /// Raw type spelling, e.g. `const Widget *`.
    #[serde(default)]
    pub spelling: String,

    /// Declared type name behind the spelling, if the parser resolved one.
    #[serde(default)]
    pub decl: Option<String>,

    /// Pointee type, present for pointer/reference-like types.
    #[serde(default)]
    pub pointee: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Creates a type with only a raw spelling.
    #[must_use]
    pub fn new(spelling: impl Into<String>) -> Self {
        Self {
            spelling: spelling.into(),
            decl: None,
            pointee: None,
        }
    }

    /// Sets the resolved declaration name.
    #[must_use]
    pub fn with_decl(mut self, decl: impl Into<String>) -> Self {
        self.decl = Some(decl.into());
        self
    }

    /// Sets the pointee type.
    #[must_use]
    pub fn with_pointee(mut self, pointee: TypeRef) -> Self {
        self.pointee = Some(Box::new(pointee));
        self
    }

    /// Returns the normalized type name used for exclusion matching and
    /// default display.
    ///
    /// Resolution order: for pointer/reference-like types with a non-empty
    /// pointee spelling, the pointee's declared name (falling back to the
    /// raw spelling of the outer type); otherwise the declared name of the
    /// type itself; otherwise the raw spelling verbatim.
    #[must_use]
    pub fn normalized_name(&self) -> String {
        if let Some(pointee) = &self.pointee {
            if !pointee.spelling.is_empty() {
                if let Some(decl) = pointee.decl.as_deref().filter(|d| !d.is_empty()) {
                    return decl.to_string();
                }
                return self.spelling.clone();
            }
        }

        if let Some(decl) = self.decl.as_deref().filter(|d| !d.is_empty()) {
            return decl.to_string();
        }

        self.spelling.clone()
    }
}

/// One node of the parsed tree.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    /// Kind of this node.
    pub kind: NodeKind,

    /// Name of the declared entity (empty for anonymous nodes).
    #[serde(default)]
    pub spelling: String,

    /// Absolute path of the source file this node was declared in.
    ///
    /// Synthesized nodes carry no file and never match a rule.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Access specifier (defaults to public for non-member nodes).
    #[serde(default)]
    pub access: Access,

    /// Whether the declaration is static.
    #[serde(default, rename = "static")]
    pub is_static: bool,

    /// Whether the declaration is const-qualified.
    #[serde(default, rename = "const")]
    pub is_const: bool,

    /// Declared type, present on parameter nodes.
    #[serde(default, rename = "type")]
    pub ty: Option<TypeRef>,

    /// Return type, present on method nodes.
    #[serde(default, rename = "result-type")]
    pub result_type: Option<TypeRef>,

    /// Child nodes in declaration order.
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a node with the given kind and spelling.
    #[must_use]
    pub fn new(kind: NodeKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            file: None,
            access: Access::default(),
            is_static: false,
            is_const: false,
            ty: None,
            result_type: None,
            children: Vec::new(),
        }
    }

    /// Sets the source file path.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the access specifier.
    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Marks the declaration static.
    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Marks the declaration const-qualified.
    #[must_use]
    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    /// Sets the declared type (parameters).
    #[must_use]
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Sets the return type (methods).
    #[must_use]
    pub fn with_result_type(mut self, ty: TypeRef) -> Self {
        self.result_type = Some(ty);
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Deserializes a tree from a JSON dump produced by a parser frontend.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or does not match the
    /// node schema.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
