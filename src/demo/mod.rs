//! Bundled demonstration suites
//!
//! Exercised by the `swat run` and `swat list` commands. Every suite uses a
//! JSON value as its context.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::assert::assert_many;
use crate::models::{Callable, Done, Suite};

const DELAY: Duration = Duration::from_millis(20);

/// A named bundled suite
pub struct DemoSuite {
    pub name: &'static str,
    pub description: &'static str,
    pub suite: Suite<Value>,
}

/// All bundled suites in run order
pub fn all() -> Vec<DemoSuite> {
    vec![
        DemoSuite {
            name: "basic",
            description: "Verdicts, malformed entries, thrown errors and nested suites",
            suite: basic(),
        },
        DemoSuite {
            name: "hooks",
            description: "beforeEach / afterEach nesting across four levels",
            suite: hooks(),
        },
        DemoSuite {
            name: "context",
            description: "Context threading and per-test isolation",
            suite: context(),
        },
        DemoSuite {
            name: "conventions",
            description: "Sync, callback and async hooks and tests",
            suite: conventions(),
        },
    ]
}

pub fn find(name: &str) -> Option<DemoSuite> {
    all().into_iter().find(|demo| demo.name == name)
}

fn basic() -> Suite<Value> {
    Suite::new()
        .invalid("a str", "str")
        .test("returns null", |_| Value::Null)
        .test("test1", |_| true)
        .async_test("very async", |_| async {
            tokio::time::sleep(DELAY).await;
            "took a while"
        })
        .test_fn(
            "throws",
            Callable::sync(|_| Err(Value::from("an exception"))),
        )
        .suite(
            "suite2",
            Suite::new()
                .test("test6", |_| {
                    let (greeting, seven) = ("hey", 7);
                    assert_many([
                        Value::Bool(true),
                        check(greeting == "ho", "nested in a suite"),
                        check(seven == 9, "seven wasn't nine"),
                    ])
                })
                .test("test7", |_| assert_many(Vec::<Value>::new()))
                .suite(
                    "suite3",
                    Suite::new().test("test7", |_| check(0_u8.is_power_of_two(), "pretty nested")),
                ),
        )
        .test("skip-me", |_| false)
}

/// `true`, or `message` as the failure verdict
fn check(condition: bool, message: &str) -> Value {
    if condition {
        Value::Bool(true)
    } else {
        Value::from(message)
    }
}

/// Appends `step` to the context's `trace` array
fn trace_step(step: &'static str) -> Callable<Value, Value> {
    Callable::from_fn(move |mut ctx: Value| {
        match ctx.get_mut("trace").and_then(Value::as_array_mut) {
            Some(trace) => trace.push(step.into()),
            None => ctx = json!({ "trace": [step] }),
        }
        ctx
    })
}

fn traced(ctx: &Value) -> Vec<&str> {
    ctx["trace"]
        .as_array()
        .map(|steps| steps.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn hooks() -> Suite<Value> {
    let suite_hook = |label: &'static str| Callable::from_fn(move |_: ()| debug!("{}", label));

    Suite::new()
        .before(suite_hook("b-a"))
        .before_each(trace_step("be-a"))
        .after_each(trace_step("ae-a"))
        .after(suite_hook("a-a"))
        .test("test1", |ctx: Value| traced(&ctx) == ["be-a"])
        .suite(
            "hark",
            Suite::new()
                .before(suite_hook("b-b"))
                .before_each(trace_step("be-b"))
                .after_each(trace_step("ae-b"))
                .after(suite_hook("a-b"))
                .test("test2", |ctx: Value| traced(&ctx) == ["be-a", "be-b"])
                .suite(
                    "suite2",
                    Suite::new()
                        .before_each(trace_step("be-c"))
                        .after_each(trace_step("ae-c"))
                        .test("test3", |ctx: Value| traced(&ctx) == ["be-a", "be-b", "be-c"])
                        .suite(
                            "suite3",
                            Suite::new()
                                .before_each(trace_step("be-d"))
                                .after_each(trace_step("ae-d"))
                                .test("test4", |ctx: Value| {
                                    traced(&ctx) == ["be-a", "be-b", "be-c", "be-d"]
                                }),
                        ),
                ),
        )
        .test("suite1", |ctx: Value| traced(&ctx) == ["be-a"])
}

fn context() -> Suite<Value> {
    Suite::new()
        .before_each(Callable::from_fn(|_| json!({ "something": 7, "somethingElse": 9 })))
        .test("is_a_0", |c: Value| c["something"] == 7)
        .test("is_a_2", |c: Value| c["somethingElse"] == 9)
        .suite(
            "suite_a",
            Suite::new()
                .before_each(Callable::from_fn(|mut c: Value| {
                    c["somethingElse"] = json!(50);
                    c
                }))
                .test("is_a_0", |mut c: Value| {
                    c["somethingElse"] = json!(1);
                    c["something"] == 7
                })
                .test("iaas_a_0", |c: Value| c["somethingElse"] == 50),
        )
}

fn conventions() -> Suite<Value> {
    let sync = Suite::new()
        .before(Callable::from_fn(|_| debug!("sync before")))
        .before_each(Callable::from_fn(|_| json!("sync")))
        .test("test", |c: Value| c == "sync")
        .after_each(Callable::from_fn(|c: Value| {
            debug!("sync {}", c);
            c
        }))
        .after(Callable::from_fn(|_| debug!("sync after")));

    let callback = Suite::new()
        .before(Callable::callback(|_, done: Done<()>| {
            tokio::spawn(async move {
                tokio::time::sleep(DELAY).await;
                debug!("callback before");
                done.resolve(());
            });
        }))
        .before_each(Callable::callback(|_, done: Done<Value>| {
            tokio::spawn(async move {
                tokio::time::sleep(DELAY).await;
                done.resolve(json!("callback"));
            });
        }))
        .callback_test("test", |c: Value, done| {
            tokio::spawn(async move {
                tokio::time::sleep(DELAY).await;
                done.resolve(Value::Bool(c == "callback"));
            });
        })
        .after_each(Callable::callback(|c: Value, done: Done<Value>| {
            tokio::spawn(async move {
                tokio::time::sleep(DELAY).await;
                debug!("callback {}", c);
                done.resolve(c);
            });
        }))
        .after(Callable::callback(|_, done: Done<()>| {
            tokio::spawn(async move {
                tokio::time::sleep(DELAY).await;
                debug!("callback after");
                done.resolve(());
            });
        }));

    let promise = Suite::new()
        .before(Callable::future(|_| async {
            tokio::time::sleep(DELAY).await;
            debug!("async before");
            Ok(())
        }))
        .before_each(Callable::future(|_| async {
            tokio::time::sleep(DELAY).await;
            Ok(json!("async"))
        }))
        .async_test("test", |c: Value| async move {
            tokio::time::sleep(DELAY).await;
            c == "async"
        })
        .after_each(Callable::future(|c: Value| async move {
            tokio::time::sleep(DELAY).await;
            debug!("async {}", c);
            Ok(c)
        }))
        .after(Callable::future(|_| async {
            tokio::time::sleep(DELAY).await;
            debug!("async after");
            Ok(())
        }));

    Suite::new()
        .suite("sync", sync)
        .suite("callback", callback)
        .suite("async", promise)
}
