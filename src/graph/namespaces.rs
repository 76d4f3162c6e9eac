//! Namespace grouping pre-pass

use super::context::GraphContext;

/// Distinct, non-empty namespaces in first-seen order
pub fn distinct_namespaces<'a, I>(namespaces: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    namespaces
        .into_iter()
        .filter(|ns| !ns.is_empty() && seen.insert(*ns))
        .collect()
}

/// Create one compound node per namespace before any dependent node
pub fn add_namespace_nodes<'a, I>(ctx: &mut GraphContext, namespaces: I)
where
    I: IntoIterator<Item = &'a str>,
{
    for namespace in distinct_namespaces(namespaces) {
        ctx.ensure_namespace(namespace);
    }
}
