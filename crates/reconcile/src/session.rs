//! Two-feed session: independent builds joined before reconciliation.
//!
//! Each feed is read and aggregated on its own thread. The builds share no
//! state; a failure (or panic) in one is reported for that feed and the step
//! it was in, and reconciliation runs only when both produced a non-empty
//! aggregate.

use crate::reconciler::Reconciliation;
use orderstream_book::OrderBookAggregate;
use orderstream_core::config::SessionConfig;
use orderstream_core::{BuildStep, Error, Result, Source};
use orderstream_ingestion::RowSource;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{info, warn};

/// Read one feed and build its aggregate.
pub fn build_aggregate(
    feed: Source,
    source: &dyn RowSource,
    config: &SessionConfig,
) -> Result<OrderBookAggregate> {
    tracked_build(feed, |on_step| {
        let rows = source
            .read_rows()
            .map_err(|e| e.in_build(feed, BuildStep::Read))?;
        Ok(OrderBookAggregate::build_tracked(
            source.label(),
            &rows,
            config.book_depth,
            on_step,
        ))
    })
}

/// Run `build`, turning a panic into a build error at the last step it
/// reported. Steps start at `Read`.
fn tracked_build<T>(
    feed: Source,
    build: impl FnOnce(&mut dyn FnMut(BuildStep)) -> Result<T>,
) -> Result<T> {
    let mut step = BuildStep::Read;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        build(&mut |next: BuildStep| step = next)
    }));
    outcome.unwrap_or_else(|payload| Err(Error::build(feed, step, panic_message(payload.as_ref()))))
}

/// Outcome of both builds.
#[derive(Debug)]
pub struct Builds {
    pub a: Result<OrderBookAggregate>,
    pub b: Result<OrderBookAggregate>,
}

/// Build both feeds in parallel and wait for both to finish.
pub fn build_pair(a: &dyn RowSource, b: &dyn RowSource, config: &SessionConfig) -> Builds {
    thread::scope(|scope| {
        let handle_a = scope.spawn(move || build_aggregate(Source::A, a, config));
        let handle_b = scope.spawn(move || build_aggregate(Source::B, b, config));
        Builds {
            a: join_build(Source::A, handle_a.join()),
            b: join_build(Source::B, handle_b.join()),
        }
    })
}

fn join_build(
    feed: Source,
    joined: thread::Result<Result<OrderBookAggregate>>,
) -> Result<OrderBookAggregate> {
    let outcome = joined.unwrap_or_else(|payload| {
        Err(Error::build(feed, BuildStep::Join, panic_message(payload.as_ref())))
    });
    if let Err(e) = &outcome {
        warn!(%feed, error = %e, "build failed");
    }
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "build thread panicked".to_string()
    }
}

impl Builds {
    /// Check both builds and reconcile them.
    ///
    /// The first failure, in source order, is returned; an empty aggregate
    /// counts as a failure.
    pub fn into_session(self) -> Result<Session> {
        let a = require_non_empty(Source::A, self.a);
        let b = require_non_empty(Source::B, self.b);
        let (a, b) = (a?, b?);
        Ok(Session::reconcile(a, b))
    }
}

fn require_non_empty(
    feed: Source,
    outcome: Result<OrderBookAggregate>,
) -> Result<OrderBookAggregate> {
    let aggregate = outcome?;
    if aggregate.is_empty() {
        warn!(%feed, label = aggregate.label(), "aggregate is empty, skipping reconciliation");
        return Err(Error::EmptyAggregate { feed });
    }
    Ok(aggregate)
}

/// Two built aggregates and their reconciliation.
#[derive(Debug, Clone)]
pub struct Session {
    pub a: OrderBookAggregate,
    pub b: OrderBookAggregate,
    pub reconciliation: Reconciliation,
}

impl Session {
    /// Reconcile two finished aggregates.
    pub fn reconcile(a: OrderBookAggregate, b: OrderBookAggregate) -> Self {
        let reconciliation = Reconciliation::between(&a, &b);
        info!(
            bid_prices = reconciliation.bid.len(),
            ask_prices = reconciliation.ask.len(),
            "reconciled feeds"
        );
        Self { a, b, reconciliation }
    }

    /// Build both feeds and reconcile them.
    pub fn run(a: &dyn RowSource, b: &dyn RowSource, config: &SessionConfig) -> Result<Self> {
        build_pair(a, b, config).into_session()
    }

    pub fn aggregate(&self, feed: Source) -> &OrderBookAggregate {
        match feed {
            Source::A => &self.a,
            Source::B => &self.b,
        }
    }
}
