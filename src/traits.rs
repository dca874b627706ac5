use std::sync::Arc;

use crate::error::ProviderError;
use crate::types::AccountData;

/// Source of per-subject attributes, e.g. a remote identity or LMS service.
///
/// Callers fetch attributes first and hand them to
/// [`crate::evaluate_policy`]; the evaluator itself never calls a provider.
pub trait AttributeProvider: Send + Sync {
    /// Fetch the attributes and active identifiers for `subject`.
    fn fetch(&self, subject: &str) -> Result<AccountData, ProviderError>;
}

impl<P: AttributeProvider + ?Sized> AttributeProvider for Arc<P> {
    fn fetch(&self, subject: &str) -> Result<AccountData, ProviderError> {
        (**self).fetch(subject)
    }
}

impl<P: AttributeProvider + ?Sized> AttributeProvider for Box<P> {
    fn fetch(&self, subject: &str) -> Result<AccountData, ProviderError> {
        (**self).fetch(subject)
    }
}
