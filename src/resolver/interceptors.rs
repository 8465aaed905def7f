use crate::config::{InterceptorRef, Params};
use crate::error::{ConfigError, CycleKind};

use super::PackageDefaults;

/// One resolved link of an action's interceptor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorMapping {
    pub name: String,
    pub class_name: String,
    pub params: Params,
}

/// Expand `refs` in order into a flat interceptor chain.
///
/// A binding may name an interceptor or a stack visible to the package. Stacks expand
/// recursively; a binding's `member.param` keys override the parameters of the stack member
/// called `member`.
///
/// # Errors
///
/// - [`ConfigError::UnknownInterceptor`] for a name that is neither interceptor nor stack
/// - [`ConfigError::CyclicInheritance`] when a stack reaches itself again
pub fn expand_interceptor_refs(
    refs: &[InterceptorRef],
    defaults: &PackageDefaults,
) -> Result<Vec<InterceptorMapping>, ConfigError> {
    let mut chain = Vec::new();
    let mut stack_path = Vec::new();
    for binding in refs {
        expand(
            &binding.name,
            &binding.params,
            defaults,
            &mut stack_path,
            &mut chain,
        )?;
    }
    Ok(chain)
}

fn expand(
    name: &str,
    params: &Params,
    defaults: &PackageDefaults,
    stack_path: &mut Vec<String>,
    out: &mut Vec<InterceptorMapping>,
) -> Result<(), ConfigError> {
    if let Some(interceptor) = defaults.interceptors.get(name) {
        let mut merged = interceptor.params.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        out.push(InterceptorMapping {
            name: interceptor.name.clone(),
            class_name: interceptor.class_name.clone(),
            params: merged,
        });
        return Ok(());
    }

    let Some(stack) = defaults.interceptor_stacks.get(name) else {
        return Err(ConfigError::UnknownInterceptor {
            package: defaults.name.clone(),
            name: name.to_string(),
        });
    };

    if stack_path.iter().any(|s| s == name) {
        let mut chain = stack_path.clone();
        chain.push(name.to_string());
        return Err(ConfigError::CyclicInheritance {
            kind: CycleKind::InterceptorStack,
            chain,
        });
    }

    stack_path.push(name.to_string());
    for member in &stack.refs {
        let member_params = member_overrides(&member.name, &member.params, params);
        expand(&member.name, &member_params, defaults, stack_path, out)?;
    }
    stack_path.pop();
    Ok(())
}

/// Member params overlaid with `member.key` entries from the enclosing binding.
fn member_overrides(member: &str, own: &Params, outer: &Params) -> Params {
    let mut merged = own.clone();
    for (key, value) in outer {
        if let Some(param) = key
            .strip_prefix(member)
            .and_then(|rest| rest.strip_prefix('.'))
        {
            if !param.is_empty() {
                merged.insert(param.to_string(), value.clone());
            }
        }
    }
    merged
}
