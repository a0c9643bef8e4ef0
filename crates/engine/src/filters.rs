use crate::bindings::BindingResolver;
use crate::config::LogConfig;
use crate::types::VariableBuckets;
use tree_sitter::Node;

/// Drop bucket entries whose binding is never read.
///
/// `scope` is the function node the buckets were collected for.
pub fn filter_unused(variables: &mut VariableBuckets, scope: Node<'_>, source: &str) {
    let owned: Vec<String> = variables
        .iter()
        .flat_map(|(_, names)| names.iter().cloned())
        .collect();
    let names: Vec<&str> = owned.iter().map(String::as_str).collect();
    let unused = BindingResolver::new(scope, source).unused(&names);
    if unused.is_empty() {
        return;
    }

    variables.retain(|bucket, name| {
        let dead = unused.contains(name);
        if dead {
            log::debug!("dropping unused {} `{name}`", bucket.as_str());
        }
        !dead
    });
}

/// Drop names on the configured deny-list from every bucket and from `args`
pub fn filter_sensitive(
    variables: &mut VariableBuckets,
    args: &mut Vec<String>,
    config: &LogConfig,
) {
    if config.sensitive_keys.is_empty() {
        return;
    }
    variables.retain(|_, name| !config.is_sensitive(name));
    args.retain(|name| !config.is_sensitive(name));
}
