//! Suite definitions
//!
//! A suite is an ordered set of named entries (tests, nested suites or
//! malformed values) plus optional lifecycle hooks and a timeout override.

use serde_json::Value;
use std::fmt;
use std::future::Future;

use super::callable::{Callable, Done};

/// Once-per-suite hook (`before` / `after`)
pub type SuiteHook = Callable<(), ()>;

/// Per-test hook threading the context (`beforeEach` / `afterEach`)
pub type EachHook<C> = Callable<C, C>;

/// Test body: receives the context, resolves to a verdict value
pub type TestFn<C> = Callable<C, Value>;

/// A single named entry of a suite
pub enum Entry<C> {
    Test(TestFn<C>),
    Suite(Suite<C>),
    /// Neither a test nor a suite; reported as a failing test
    Invalid(Value),
}

impl<C> Entry<C> {
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Test(_) => "test",
            Entry::Suite(_) => "suite",
            Entry::Invalid(_) => "invalid",
        }
    }
}

impl<C> fmt::Debug for Entry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Test(test) => f.debug_tuple("Test").field(test).finish(),
            Entry::Suite(suite) => f.debug_tuple("Suite").field(suite).finish(),
            Entry::Invalid(value) => f.debug_tuple("Invalid").field(value).finish(),
        }
    }
}

impl<C> From<Suite<C>> for Entry<C> {
    fn from(suite: Suite<C>) -> Self {
        Entry::Suite(suite)
    }
}

impl<C> From<Value> for Entry<C> {
    fn from(value: Value) -> Self {
        Entry::Invalid(value)
    }
}

/// Suite definition, generic over the context type threaded through hooks
pub struct Suite<C> {
    /// Entries in declaration order
    pub entries: Vec<(String, Entry<C>)>,
    pub before: Option<SuiteHook>,
    pub before_each: Option<EachHook<C>>,
    pub after_each: Option<EachHook<C>>,
    pub after: Option<SuiteHook>,
    /// Timeout override for this level and its descendants
    pub timeout_ms: Option<u64>,
}

impl<C> Suite<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            before: None,
            before_each: None,
            after_each: None,
            after: None,
            timeout_ms: None,
        }
    }

    /// Add an entry. Re-using a name replaces the earlier value in place.
    pub fn entry(mut self, name: impl Into<String>, entry: impl Into<Entry<C>>) -> Self {
        let name = name.into();
        let entry = entry.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((name, entry)),
        }
        self
    }

    pub fn suite(self, name: impl Into<String>, suite: Suite<C>) -> Self {
        self.entry(name, Entry::Suite(suite))
    }

    pub fn test_fn(self, name: impl Into<String>, test: TestFn<C>) -> Self {
        self.entry(name, Entry::Test(test))
    }

    /// Add a malformed entry
    pub fn invalid(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entry(name, Entry::Invalid(value.into()))
    }

    pub fn before(mut self, hook: SuiteHook) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn before_each(mut self, hook: EachHook<C>) -> Self {
        self.before_each = Some(hook);
        self
    }

    pub fn after_each(mut self, hook: EachHook<C>) -> Self {
        self.after_each = Some(hook);
        self
    }

    pub fn after(mut self, hook: SuiteHook) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Entry<C>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry)
    }
}

impl<C> Suite<C>
where
    C: Send + 'static,
{
    /// Add a synchronous test; `true` passes, anything else fails with that value.
    pub fn test<F, V>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(C) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.test_fn(name, Callable::from_fn(move |ctx| f(ctx).into()))
    }

    pub fn async_test<F, Fut, V>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = V> + Send + 'static,
        V: Into<Value>,
    {
        self.test_fn(
            name,
            Callable::future(move |ctx| {
                let fut = f(ctx);
                async move { Ok(fut.await.into()) }
            }),
        )
    }

    pub fn callback_test<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(C, Done<Value>) + Send + Sync + 'static,
    {
        self.test_fn(name, Callable::callback(f))
    }
}

impl<C> Default for Suite<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Suite<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("entries", &self.entries)
            .field("before", &self.before)
            .field("before_each", &self.before_each)
            .field("after_each", &self.after_each)
            .field("after", &self.after)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_keep_declaration_order() {
        let suite: Suite<()> = Suite::new()
            .test("b", |_| true)
            .suite("a", Suite::new())
            .invalid("c", "STRING");

        let names: Vec<_> = suite.entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(suite.get("a").map(Entry::kind), Some("suite"));
        assert_eq!(suite.get("c").map(Entry::kind), Some("invalid"));
    }

    #[test]
    fn test_reused_name_replaces_in_place() {
        let suite: Suite<()> = Suite::new()
            .test("first", |_| true)
            .test("second", |_| true)
            .invalid("first", json!(3));

        assert_eq!(suite.len(), 2);
        assert_eq!(suite.entries[0].0, "first");
        assert_eq!(suite.get("first").map(Entry::kind), Some("invalid"));
    }

    #[test]
    fn test_hooks_and_timeout() {
        let suite: Suite<u32> = Suite::new()
            .before(Callable::from_fn(|_| ()))
            .before_each(Callable::from_fn(|n| n + 1))
            .timeout(250);

        assert!(suite.before.is_some());
        assert!(suite.before_each.is_some());
        assert!(suite.after_each.is_none());
        assert_eq!(suite.timeout_ms, Some(250));
        assert!(suite.is_empty());
    }
}
