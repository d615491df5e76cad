//! Hook chain composition
//!
//! `beforeEach` hooks accumulate outermost-first and `afterEach` hooks
//! innermost-first, so the hooks of a test unwind like a stack around it.

use std::fmt;

use super::error::RunError;
use super::timeout::TimeoutWrapper;
use crate::models::{EachHook, Suite};

/// Effective `beforeEach` / `afterEach` hooks at one nesting level
pub struct HookChain<C> {
    pub before_eaches: Vec<EachHook<C>>,
    pub after_eaches: Vec<EachHook<C>>,
}

impl<C> HookChain<C> {
    pub fn new(before_eaches: Vec<EachHook<C>>, after_eaches: Vec<EachHook<C>>) -> Self {
        Self {
            before_eaches,
            after_eaches,
        }
    }

    /// Chain for the level declared by `suite`, inheriting from `self`.
    ///
    /// Singular `before` / `after` hooks are not part of the chain.
    pub fn compose(&self, suite: &Suite<C>) -> Self {
        let mut before_eaches = self.before_eaches.clone();
        if let Some(hook) = &suite.before_each {
            before_eaches.push(hook.clone());
        }

        let mut after_eaches = Vec::with_capacity(self.after_eaches.len() + 1);
        if let Some(hook) = &suite.after_each {
            after_eaches.push(hook.clone());
        }
        after_eaches.extend(self.after_eaches.iter().cloned());

        Self {
            before_eaches,
            after_eaches,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.before_eaches.is_empty() && self.after_eaches.is_empty()
    }
}

impl<C> HookChain<C>
where
    C: Send + 'static,
{
    /// Fold the `beforeEach` hooks over `seed`, producing the test's context
    pub async fn run_before_eaches(
        &self,
        wrapper: &TimeoutWrapper,
        test_name: &str,
        seed: C,
    ) -> Result<C, RunError> {
        let label = format!("{test_name} beforeEach hook");
        fold(wrapper, &label, &self.before_eaches, seed).await
    }

    /// Fold the `afterEach` hooks over the test's context
    pub async fn run_after_eaches(
        &self,
        wrapper: &TimeoutWrapper,
        test_name: &str,
        context: C,
    ) -> Result<C, RunError> {
        let label = format!("{test_name} afterEach hook");
        fold(wrapper, &label, &self.after_eaches, context).await
    }
}

async fn fold<C>(
    wrapper: &TimeoutWrapper,
    label: &str,
    hooks: &[EachHook<C>],
    mut context: C,
) -> Result<C, RunError>
where
    C: Send + 'static,
{
    for hook in hooks {
        context = wrapper.call(label, hook, context).await?;
    }
    Ok(context)
}

impl<C> Clone for HookChain<C> {
    fn clone(&self) -> Self {
        Self {
            before_eaches: self.before_eaches.clone(),
            after_eaches: self.after_eaches.clone(),
        }
    }
}

impl<C> Default for HookChain<C> {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl<C> fmt::Debug for HookChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("before_eaches", &self.before_eaches.len())
            .field("after_eaches", &self.after_eaches.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Callable;

    type Trace = Vec<&'static str>;

    fn tracer(name: &'static str) -> EachHook<Trace> {
        Callable::from_fn(move |mut trace: Trace| {
            trace.push(name);
            trace
        })
    }

    #[tokio::test]
    async fn test_compose_orders_hooks_lifo() {
        let outer: Suite<Trace> = Suite::new()
            .before_each(tracer("be-outer"))
            .after_each(tracer("ae-outer"));
        let inner: Suite<Trace> = Suite::new()
            .before_each(tracer("be-inner"))
            .after_each(tracer("ae-inner"));

        let chain = HookChain::default().compose(&outer).compose(&inner);
        let wrapper = TimeoutWrapper::default();

        let context = chain
            .run_before_eaches(&wrapper, "t", Vec::new())
            .await
            .unwrap();
        assert_eq!(context, vec!["be-outer", "be-inner"]);

        let context = chain.run_after_eaches(&wrapper, "t", context).await.unwrap();
        assert_eq!(
            context,
            vec!["be-outer", "be-inner", "ae-inner", "ae-outer"]
        );
    }

    #[test]
    fn test_compose_without_hooks_is_unchanged() {
        let inherited = HookChain::new(vec![tracer("be")], vec![tracer("ae")]);
        let plain: Suite<Trace> = Suite::new().before(Callable::from_fn(|_| ()));

        let chain = inherited.compose(&plain);
        assert_eq!(chain.before_eaches.len(), 1);
        assert_eq!(chain.after_eaches.len(), 1);
        assert!(HookChain::<Trace>::default().is_empty());
    }

    #[tokio::test]
    async fn test_failing_hook_labels_the_test() {
        let failing: EachHook<Trace> = Callable::sync(|_| Err("broken".into()));
        let chain = HookChain::new(vec![failing], Vec::new());

        let err = chain
            .run_before_eaches(&TimeoutWrapper::default(), "always passes", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.label(), "always passes beforeEach hook");
    }
}
