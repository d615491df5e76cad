//! Suite execution runner
//!
//! Walks a suite definition depth-first, strictly in declaration order, and
//! assembles a result tree mirroring its nesting.
//!
//! Test bodies are isolated: any failure becomes a FAIL result. Hooks and
//! middleware steps are not: their failure aborts the level that ran them and
//! every ancestor level, so the whole run resolves to an error.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::{ErrorFactory, RunError};
use super::filter::Filter;
use super::hooks::HookChain;
use super::middleware::{Middleware, MiddlewarePipeline};
use super::timeout::{TimeoutWrapper, DEFAULT_TIMEOUT_MS};
use crate::models::{EachHook, Entry, Suite, SuiteResult, TestFn, TestResult};
use crate::utils::Timer;

/// Error recorded for entries that are neither a test nor a suite
pub const INVALID_ENTRY_MESSAGE: &str =
    "All test object values must be a function (test) or an object (suite)";

/// Label used for the hooks of the unnamed top-level suite
pub const ROOT_SUITE_LABEL: &str = "Root suite";

/// Produces the seed context of each test's `beforeEach` fold
pub type ContextFactory<C> = Arc<dyn Fn() -> C + Send + Sync>;

/// State inherited by one nesting level from its parent
struct Level<C> {
    wrapper: TimeoutWrapper,
    chain: HookChain<C>,
    name: Option<String>,
}

/// Suite runner
pub struct SuiteRunner<C> {
    context_factory: ContextFactory<C>,
    wrapper: TimeoutWrapper,
    chain: HookChain<C>,
    suite_name: Option<String>,
    pipeline: MiddlewarePipeline,
}

impl<C> SuiteRunner<C>
where
    C: Clone + Send + 'static,
{
    /// Create a runner seeding every test's context from `context_factory`
    pub fn new(context_factory: impl Fn() -> C + Send + Sync + 'static) -> Self {
        Self {
            context_factory: Arc::new(context_factory),
            wrapper: TimeoutWrapper::default(),
            chain: HookChain::default(),
            suite_name: None,
            pipeline: MiddlewarePipeline::default(),
        }
    }

    /// Timeout for levels that declare none
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.wrapper = self.wrapper.with_timeout_ms(timeout_ms);
        self
    }

    pub fn error_factory(mut self, error_factory: ErrorFactory) -> Self {
        self.wrapper = TimeoutWrapper::new(self.wrapper.timeout_ms(), error_factory);
        self
    }

    /// `beforeEach` hooks inherited from outside the top-level suite
    pub fn before_eaches(mut self, hooks: Vec<EachHook<C>>) -> Self {
        self.chain.before_eaches = hooks;
        self
    }

    /// `afterEach` hooks inherited from outside the top-level suite
    pub fn after_eaches(mut self, hooks: Vec<EachHook<C>>) -> Self {
        self.chain.after_eaches = hooks;
        self
    }

    /// Name the top-level suite; an unnamed one produces a ROOT_SUITE node
    pub fn suite_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = Some(name.into());
        self
    }

    pub fn middlewares(mut self, middlewares: Vec<Middleware>) -> Self {
        self.pipeline = MiddlewarePipeline::new(middlewares);
        self
    }

    /// Run `suite` and every nested suite.
    ///
    /// Resolves with the full tree even when tests fail; returns the hook
    /// error when any hook or middleware step fails or times out.
    pub async fn run(&self, suite: &Suite<C>, filter: &Filter) -> Result<SuiteResult, RunError> {
        let timer = Timer::start("suite run");
        let level = Level {
            wrapper: self.wrapper.clone(),
            chain: self.chain.clone(),
            name: self.suite_name.clone(),
        };

        let outcome = self.walk(level, suite, filter).await;
        match &outcome {
            Ok(tree) => info!(
                "Run completed in {}ms - {} tests, {} failed",
                timer.elapsed_ms(),
                tree.count_tests(),
                tree.failed_tests().len()
            ),
            Err(err) => error!("Run aborted after {}ms: {}", timer.elapsed_ms(), err),
        }
        outcome
    }

    fn walk<'a>(
        &'a self,
        level: Level<C>,
        suite: &'a Suite<C>,
        filter: &'a Filter,
    ) -> BoxFuture<'a, Result<SuiteResult, RunError>> {
        async move {
            let wrapper = match suite.timeout_ms {
                Some(timeout_ms) => level.wrapper.with_timeout_ms(timeout_ms),
                None => level.wrapper,
            };
            let chain = level.chain.compose(suite);
            let label = level.name.as_deref().unwrap_or(ROOT_SUITE_LABEL);

            debug!(suite = label, entries = suite.len(), "entering suite");

            if let Some(before) = &suite.before {
                wrapper
                    .call(&format!("{label} before hook"), before, ())
                    .await
                    .inspect_err(|err| error!(suite = label, "Aborting suite: {}", err))?;
            }

            let mut result = match &level.name {
                Some(name) => SuiteResult::named(name.clone()),
                None => SuiteResult::root(),
            };

            for (name, entry) in &suite.entries {
                if !filter.allows(name) {
                    debug!(entry = name.as_str(), "skipped");
                    result.tests.push(TestResult::skip(name.as_str()));
                    continue;
                }

                match entry {
                    Entry::Test(test) => {
                        let test_result = self.run_test(&wrapper, &chain, name, test).await?;
                        info!("  {}", test_result);
                        result.tests.push(test_result);
                    }
                    Entry::Suite(child) => {
                        let child_level = Level {
                            wrapper: wrapper.clone(),
                            chain: chain.clone(),
                            name: Some(name.clone()),
                        };
                        let child_result = self.walk(child_level, child, filter).await?;
                        result.suites.push(child_result);
                    }
                    Entry::Invalid(value) => {
                        warn!(entry = name.as_str(), value = %value, "malformed suite entry");
                        result.tests.push(TestResult::fail(
                            name.as_str(),
                            Value::from(INVALID_ENTRY_MESSAGE),
                        ));
                    }
                }
            }

            if let Some(after) = &suite.after {
                wrapper
                    .call(&format!("{label} after hook"), after, ())
                    .await
                    .inspect_err(|err| error!(suite = label, "Aborting suite: {}", err))?;
            }

            debug!(suite = label, "leaving suite");
            Ok(result)
        }
        .boxed()
    }

    async fn run_test(
        &self,
        wrapper: &TimeoutWrapper,
        chain: &HookChain<C>,
        name: &str,
        test: &TestFn<C>,
    ) -> Result<TestResult, RunError> {
        let seed = (self.context_factory)();
        let context = chain.run_before_eaches(wrapper, name, seed).await?;
        let result = self
            .pipeline
            .run(wrapper, context.clone(), name, test)
            .await?;
        chain.run_after_eaches(wrapper, name, context).await?;
        Ok(result)
    }
}

impl<C> SuiteRunner<C>
where
    C: Clone + Default + Send + 'static,
{
    /// Runner with a default-constructed context and the timer middleware
    pub fn with_defaults() -> Self {
        Self::new(C::default)
            .timeout_ms(DEFAULT_TIMEOUT_MS)
            .middlewares(vec![Middleware::timer()])
    }
}

/// Run `suite` with default settings: default context, timer middleware,
/// default timeout and default filter.
pub async fn run<C>(suite: &Suite<C>) -> Result<SuiteResult, RunError>
where
    C: Clone + Default + Send + 'static,
{
    SuiteRunner::with_defaults()
        .run(suite, &Filter::default())
        .await
}
