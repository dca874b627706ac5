use tracing::{debug, warn};

use crate::error::PolicyError;
use crate::expr::Expression;
use crate::types::Attributes;

/// Decide whether `attributes` satisfy the policy `expression`.
///
/// An empty or whitespace-only expression means "no policy" and allows.
/// Every other outcome is the truthiness of the evaluated expression, and
/// any parse error, disallowed construct or evaluation fault denies. Errors
/// are logged, never returned, so a `false` from a faulty policy looks the
/// same as a `false` from a policy that says no.
///
/// Example:
/// ```rust
/// use attrgate_core::{evaluate_policy, Attributes, Value};
///
/// let attributes = Attributes::from([
///     ("department".to_string(), Value::from("infosec")),
///     ("level".to_string(), Value::from(5)),
/// ]);
/// assert!(evaluate_policy(r#"department == "infosec" and level >= 3"#, &attributes));
/// assert!(!evaluate_policy("level + 1 > 3", &attributes));
/// assert!(evaluate_policy("", &attributes));
/// ```
pub fn evaluate_policy(expression: &str, attributes: &Attributes) -> bool {
    if expression.trim().is_empty() {
        debug!(event = "Policy", phase = "Result", "no expression, allowing");
        return true;
    }

    match decide(expression, attributes) {
        Ok(allowed) => {
            debug!(event = "Policy", phase = "Result", expression, allowed);
            allowed
        }
        Err(err) => {
            let phase = match err {
                PolicyError::Grammar(_) => "Parse",
                PolicyError::Evaluation(_) => "Evaluation",
            };
            warn!(
                event = "Policy",
                phase,
                expression,
                error = %err,
                "error evaluating attribute expression, denying"
            );
            false
        }
    }
}

fn decide(expression: &str, attributes: &Attributes) -> Result<bool, PolicyError> {
    let parsed = Expression::parse(expression)?;
    debug!(event = "Policy", phase = "Parsed", tree = %parsed);
    Ok(parsed.evaluate(attributes)?)
}

#[cfg(test)]
mod tests;
