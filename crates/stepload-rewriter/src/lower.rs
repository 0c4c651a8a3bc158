//! Lowering of static imports and exports to CommonJS

use stepload_ast::{ExportSpecifier, ImportDecl, ImportSpecifier};

/// Builds the CommonJS equivalent of `decl`, loading the module through
/// `load_expr` (a `require(...)` call or its replacement).
pub(crate) fn lower_import(decl: &ImportDecl, load_expr: &str) -> String {
    let mut default = None;
    let mut namespace = None;
    let mut named = Vec::new();

    for specifier in &decl.specifiers {
        match specifier {
            ImportSpecifier::Default(local) => default = Some(local.value.name.as_str()),
            ImportSpecifier::Namespace(local) => namespace = Some(local.value.name.as_str()),
            ImportSpecifier::Named { imported, local } => {
                let imported = imported.value.name.as_str();
                match local {
                    Some(local) if local.value.name != imported => {
                        named.push(format!("{}: {}", property_key(imported), local.value.name));
                    }
                    _ => named.push(imported.to_string()),
                }
            }
        }
    }

    let pattern = (!named.is_empty()).then(|| format!("{{ {} }}", named.join(", ")));

    // The module is loaded once; later bindings read from the first one.
    match (default.or(namespace), default.and(namespace), pattern) {
        (None, _, None) => format!("{};", load_expr),
        (None, _, Some(pattern)) => format!("const {} = {};", pattern, load_expr),
        (Some(first), None, None) => format!("const {} = {};", first, load_expr),
        (Some(first), None, Some(pattern)) => {
            format!("const {} = {}, {} = {};", first, load_expr, pattern, first)
        }
        (Some(first), Some(ns), _) => {
            format!("const {} = {}, {} = {};", first, load_expr, ns, first)
        }
    }
}

/// `exports.name = local;`
pub(crate) fn export_binding(exported: &str, local: &str) -> String {
    format!("exports{} = {};", member(exported), local)
}

/// Assignment head for an anonymous `export default` expression.
pub(crate) fn export_default_head() -> String {
    format!("exports{} =", member("default"))
}

/// `export { a, b as c } from 'm'`: copies the listed members of the
/// module loaded by `load_expr`.
pub(crate) fn lower_reexport_named(specifiers: &[ExportSpecifier], load_expr: &str) -> String {
    if specifiers.is_empty() {
        return format!("{};", load_expr);
    }
    let copies: Vec<String> = specifiers
        .iter()
        .map(|s| export_binding(s.exported_name(), &format!("__module{}", member(&s.local.value.name))))
        .collect();
    format!("{{ const __module = {}; {} }}", load_expr, copies.join(" "))
}

/// `export * from 'm'` copies every member except `default`;
/// `export * as ns from 'm'` exports the module object itself.
pub(crate) fn lower_reexport_all(as_name: Option<&str>, load_expr: &str) -> String {
    match as_name {
        Some(name) => export_binding(name, load_expr),
        None => format!(
            "{{ const __module = {}; for (const key of Object.keys(__module)) if (key !== \"default\") exports[key] = __module[key]; }}",
            load_expr
        ),
    }
}

fn is_identifier(name: &str) -> bool {
    name.chars()
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("{:?}", name)
    }
}

/// `.name`, or `["name"]` when `name` is not an identifier.
fn member(name: &str) -> String {
    if is_identifier(name) {
        format!(".{}", name)
    } else {
        format!("[{:?}]", name)
    }
}
