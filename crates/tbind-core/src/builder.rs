//! Model builder: converts a matched class declaration into the
//! intermediate model.

use crate::ast::{Access, Node, NodeKind, TypeRef};
use crate::config::Rule;
use crate::model::{Argument, Class, ClassId, ClassRegistry, Method};

/// Builds a [`Class`] from a matched class declaration and registers it.
///
/// Returns `None` (a refusal, not an error) if the class's own name is in
/// the rule's excluded-type set. Otherwise the class is registered in the
/// per-pass registry before its children are processed, so later classes in
/// the same pass can resolve it as their base.
///
/// Direct children are scanned in declaration order: public non-static
/// methods become [`Method`]s (invalid ones are silently dropped), and the
/// first base specifier records the base name plus a live registry link when
/// the base was already extracted. Bases beyond the first are ignored.
pub fn build_class(node: &Node, rule: &Rule, registry: &mut ClassRegistry) -> Option<ClassId> {
    if rule.excluded_types.contains(&node.spelling) {
        return None;
    }

    let id = registry.insert(Class::new(node.spelling.clone()));

    for child in &node.children {
        if child.kind == NodeKind::Method
            && child.access == Access::Public
            && !child.is_static
        {
            if let Some(method) = build_method(child, rule) {
                registry.get_mut(id).methods.push(method);
            }
        }

        if child.kind == NodeKind::Base && registry.get(id).base_name.is_none() {
            let base_id = registry.id_of(&child.spelling);
            let class = registry.get_mut(id);
            class.base_name = Some(child.spelling.clone());
            class.base = base_id;
        }
    }

    Some(id)
}

/// Builds a [`Method`] from a method declaration, or `None` if its return
/// type or any argument type is in the rule's excluded-type set.
fn build_method(node: &Node, rule: &Rule) -> Option<Method> {
    let result = node.result_type.clone().unwrap_or_default();

    let mut method = Method {
        name: node.spelling.clone(),
        visible_name: node.spelling.clone(),
        return_type: result.normalized_name(),
        return_full_type: result.spelling,
        is_const: node.is_const,
        arguments: Vec::new(),
    };

    for child in &node.children {
        if child.kind == NodeKind::Param {
            method.arguments.push(build_argument(child));
        }
    }
    method.finish_arguments();

    method.is_valid(&rule.excluded_types).then_some(method)
}

fn build_argument(node: &Node) -> Argument {
    let ty = node.ty.clone().unwrap_or_default();
    Argument {
        name: node.spelling.clone(),
        type_name: ty.normalized_name(),
        full_type: ty.spelling,
        last: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_rules;

    fn rule(excluded: &[&str]) -> Rule {
        let excluded_json = excluded
            .iter()
            .map(|t| format!(r#""{t}""#))
            .collect::<Vec<_>>()
            .join(",");
        parse_rules(&format!(
            r#"[{{
                "files": ["**"],
                "excluded-types": [{excluded_json}],
                "output": [{{"template": "t", "path": "p", "rule": "single-file"}}]
            }}]"#
        ))
        .unwrap()
        .remove(0)
    }

    fn method(name: &str, return_type: &str) -> Node {
        Node::new(NodeKind::Method, name)
            .with_result_type(TypeRef::new(return_type).with_decl(return_type))
    }

    fn param(name: &str, ty: &str) -> Node {
        Node::new(NodeKind::Param, name).with_type(TypeRef::new(ty).with_decl(ty))
    }

    #[test]
    fn builds_public_nonstatic_methods_in_declaration_order() {
        let node = Node::new(NodeKind::Class, "Widget")
            .with_child(method("show", "void"))
            .with_child(method("internal", "void").with_access(Access::Private))
            .with_child(method("create", "void").with_static(true))
            .with_child(method("hide", "void"));

        let mut registry = ClassRegistry::new();
        let id = build_class(&node, &rule(&[]), &mut registry).unwrap();

        let names: Vec<&str> = registry
            .get(id)
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["show", "hide"]);
    }

    #[test]
    fn refuses_class_with_excluded_name() {
        let node = Node::new(NodeKind::Class, "Variant");
        let mut registry = ClassRegistry::new();
        assert!(build_class(&node, &rule(&["Variant"]), &mut registry).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn drops_methods_referencing_excluded_types() {
        let node = Node::new(NodeKind::Class, "Widget")
            .with_child(method("value", "Variant"))
            .with_child(method("set", "void").with_child(param("v", "Variant")))
            .with_child(method("show", "void"));

        let mut registry = ClassRegistry::new();
        let id = build_class(&node, &rule(&["Variant"]), &mut registry).unwrap();

        let methods = &registry.get(id).methods;
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "show");
    }

    #[test]
    fn records_first_base_only() {
        let node = Node::new(NodeKind::Class, "Widget")
            .with_child(Node::new(NodeKind::Base, "Object"))
            .with_child(Node::new(NodeKind::Base, "Serializable"));

        let mut registry = ClassRegistry::new();
        let id = build_class(&node, &rule(&[]), &mut registry).unwrap();
        assert_eq!(registry.get(id).base_name.as_deref(), Some("Object"));
    }

    #[test]
    fn links_base_extracted_earlier_in_the_pass() {
        let r = rule(&[]);
        let mut registry = ClassRegistry::new();

        let base_node = Node::new(NodeKind::Class, "Object");
        let base_id = build_class(&base_node, &r, &mut registry).unwrap();

        let derived = Node::new(NodeKind::Class, "Widget")
            .with_child(Node::new(NodeKind::Base, "Object"));
        let id = build_class(&derived, &r, &mut registry).unwrap();

        assert_eq!(registry.get(id).base, Some(base_id));
    }

    #[test]
    fn unextracted_base_keeps_only_the_name() {
        let derived = Node::new(NodeKind::Class, "Widget")
            .with_child(Node::new(NodeKind::Base, "Object"));

        let mut registry = ClassRegistry::new();
        let id = build_class(&derived, &rule(&[]), &mut registry).unwrap();

        let class = registry.get(id);
        assert_eq!(class.base_name.as_deref(), Some("Object"));
        assert!(class.base.is_none());
    }

    #[test]
    fn captures_const_qualifier_and_argument_types() {
        let node = Node::new(NodeKind::Class, "Widget").with_child(
            method("resize", "bool")
                .with_const(true)
                .with_child(param("w", "int"))
                .with_child(
                    Node::new(NodeKind::Param, "anchor").with_type(
                        TypeRef::new("const Point *")
                            .with_pointee(TypeRef::new("Point").with_decl("Point")),
                    ),
                ),
        );

        let mut registry = ClassRegistry::new();
        let id = build_class(&node, &rule(&[]), &mut registry).unwrap();

        let m = &registry.get(id).methods[0];
        assert!(m.is_const);
        assert_eq!(m.return_type, "bool");
        assert_eq!(m.arguments.len(), 2);
        assert_eq!(m.arguments[0].type_name, "int");
        assert_eq!(m.arguments[1].type_name, "Point");
        assert_eq!(m.arguments[1].full_type, "const Point *");
        assert!(m.arguments[1].last);
    }
}
