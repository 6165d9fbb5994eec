//! Request-scoped context handle
//!
//! A [`RequestContext`] is passed explicitly by the caller alongside a log
//! statement. The logger never interprets it: it is handed to the configured
//! context extractor and to hooks, and a clone rides along on the record so
//! that destinations can inspect it. It is never serialized.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cloneable, type-keyed bag of request-scoped values
///
/// Values are keyed by their type, so callers typically wrap their data in a
/// newtype (`struct TraceId(String)`).
///
/// # Example
///
/// ```
/// use rust_event_logger::RequestContext;
///
/// #[derive(Clone)]
/// struct TraceId(String);
///
/// let ctx = RequestContext::new().with_value(TraceId("abc-123".into()));
/// assert_eq!(ctx.value::<TraceId>().map(|t| t.0.as_str()), Some("abc-123"));
/// ```
#[derive(Clone, Default)]
pub struct RequestContext {
    values: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new context that additionally carries `value`
    ///
    /// A value of the same type already present is replaced in the new context;
    /// the original context is left untouched.
    #[must_use]
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        let mut values: HashMap<TypeId, Arc<dyn Any + Send + Sync>> = (*self.values).clone();
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Self {
            values: Arc::new(values),
        }
    }

    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("values", &self.values.len())
            .finish()
    }
}
