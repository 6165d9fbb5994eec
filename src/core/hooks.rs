//! Pre-delivery hooks and the callbacks a logger is configured with

use super::context::RequestContext;
use super::error::{LoggerError, Result};
use super::fields::Fields;
use super::record::LogRecord;
use std::fmt;
use std::sync::Arc;

/// Mutating, possibly vetoing filter run before a record is delivered
///
/// Returning `Err` drops the record: remaining hooks are skipped and no
/// destination sees it. The error itself is not reported anywhere.
pub trait Hook: Send + Sync {
    fn run(&self, context: Option<&RequestContext>, record: &mut LogRecord) -> Result<()>;
}

impl<F> Hook for F
where
    F: Fn(Option<&RequestContext>, &mut LogRecord) -> Result<()> + Send + Sync,
{
    fn run(&self, context: Option<&RequestContext>, record: &mut LogRecord) -> Result<()> {
        self(context, record)
    }
}

/// Derives fields from a request context; called once per log statement
pub type ContextExtractor = Arc<dyn Fn(&RequestContext) -> Fields + Send + Sync>;

/// Receives destination write failures
pub type ErrorHandler = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Receives the running total of records dropped on a full queue
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Hooks in registration order
#[derive(Clone, Default)]
pub struct HookChain {
    hooks: Vec<Arc<dyn Hook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<H: Hook + 'static>(&mut self, hook: H) {
        self.hooks.push(Arc::new(hook));
    }

    pub fn push_shared(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook against `record`, stopping at the first veto
    pub fn apply(&self, context: Option<&RequestContext>, record: &mut LogRecord) -> Result<()> {
        for hook in &self.hooks {
            hook.run(context, record)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Hook that replaces the value of each listed field with `"[REDACTED]"`
pub fn redact_fields<I, S>(keys: I) -> impl Hook
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    move |_: Option<&RequestContext>, record: &mut LogRecord| -> Result<()> {
        for key in &keys {
            if let Some(value) = record.fields.get_mut(key) {
                *value = "[REDACTED]".into();
            }
        }
        Ok(())
    }
}
