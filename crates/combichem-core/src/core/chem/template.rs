use std::sync::Arc;

/// Outcome of evaluating an acceptance template on one item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateResult {
    pub passed: bool,
    /// Free-form notes from the template, e.g. which filters failed.
    pub details: Vec<String>,
}

impl TemplateResult {
    pub fn pass() -> Self {
        Self {
            passed: true,
            details: Vec::new(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            details: vec![reason.into()],
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

impl From<bool> for TemplateResult {
    fn from(passed: bool) -> Self {
        Self {
            passed,
            details: Vec::new(),
        }
    }
}

/// An acceptance template applied to items at a composition node.
///
/// Templates must not panic on unusual input; an item the template cannot evaluate should
/// produce a failing result.
pub trait Template<T>: Send + Sync {
    fn evaluate(&self, item: &T) -> TemplateResult;
}

impl<T, F> Template<T> for F
where
    F: Fn(&T) -> TemplateResult + Send + Sync,
{
    fn evaluate(&self, item: &T) -> TemplateResult {
        self(item)
    }
}

/// Boxes a closure as a shareable template.
pub fn template<T, F>(f: F) -> Arc<dyn Template<T>>
where
    T: 'static,
    F: Fn(&T) -> TemplateResult + Send + Sync + 'static,
{
    Arc::new(f)
}
