// tortuga/turtle/src/pending.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deferred operation results.
//!
//! A [`Pending`] is a cloneable future over `Result<T>`. Every clone observes
//! the same outcome, so one result may feed any number of later operations.
//! Composition is explicit: `then_map`, `try_map`, `combine` and the named
//! arithmetic, comparison and logical helpers each resolve their operands
//! before applying the operator.

use crate::error::{Result, TurtleError};
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pub struct Pending<T> {
    inner: Shared<BoxFuture<'static, Result<T>>>,
}

impl<T> Clone for Pending<T> {
    fn clone(&self) -> Pending<T> {
        Pending {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Debug for Pending<T> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_struct("Pending").finish_non_exhaustive()
    }
}

impl<T> Pending<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn from_future<F>(future: F) -> Pending<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Pending {
            inner: future.boxed().shared(),
        }
    }

    pub fn ready(value: T) -> Pending<T> {
        Pending::from_future(future::ready(Ok(value)))
    }

    pub fn failed(error: TurtleError) -> Pending<T> {
        Pending::from_future(future::ready(Err(error)))
    }

    /// The outcome, if it has already been computed.
    pub fn peek(&self) -> Option<&Result<T>> {
        self.inner.peek()
    }

    pub fn then_map<U, F>(&self, f: F) -> Pending<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let this = self.clone();
        Pending::from_future(async move { this.await.map(f) })
    }

    pub fn try_map<U, F>(&self, f: F) -> Pending<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let this = self.clone();
        Pending::from_future(async move { this.await.and_then(f) })
    }

    /// Resolves both results, then applies `f`.
    pub fn combine<U, V, F>(&self, other: impl Into<Arg<U>>, f: F) -> Pending<V>
    where
        U: Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: FnOnce(T, U) -> V + Send + 'static,
    {
        let this = self.clone();
        let other = other.into();
        Pending::from_future(async move {
            let left = this.await?;
            let right = other.resolve().await?;
            Ok(f(left, right))
        })
    }

    /// Resolves every result in order.
    pub fn all(pendings: Vec<Pending<T>>) -> Pending<Vec<T>> {
        Pending::from_future(async move { future::join_all(pendings).await.into_iter().collect() })
    }
}

impl<T> Future for Pending<T>
where
    T: Clone,
{
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<T>> {
        Pin::new(&mut self.get_mut().inner).poll(cx)
    }
}

impl Pending<f64> {
    pub fn add(&self, other: impl Into<Arg<f64>>) -> Pending<f64> {
        self.combine(other, |a, b| a + b)
    }

    pub fn sub(&self, other: impl Into<Arg<f64>>) -> Pending<f64> {
        self.combine(other, |a, b| a - b)
    }

    pub fn mul(&self, other: impl Into<Arg<f64>>) -> Pending<f64> {
        self.combine(other, |a, b| a * b)
    }

    pub fn div(&self, other: impl Into<Arg<f64>>) -> Pending<f64> {
        self.combine(other, |a, b| a / b)
    }

    pub fn rem(&self, other: impl Into<Arg<f64>>) -> Pending<f64> {
        self.combine(other, |a, b| a % b)
    }

    pub fn pow(&self, other: impl Into<Arg<f64>>) -> Pending<f64> {
        self.combine(other, f64::powf)
    }

    pub fn neg(&self) -> Pending<f64> {
        self.then_map(|a| -a)
    }

    pub fn lt(&self, other: impl Into<Arg<f64>>) -> Pending<bool> {
        self.combine(other, |a, b| a < b)
    }

    pub fn le(&self, other: impl Into<Arg<f64>>) -> Pending<bool> {
        self.combine(other, |a, b| a <= b)
    }

    pub fn gt(&self, other: impl Into<Arg<f64>>) -> Pending<bool> {
        self.combine(other, |a, b| a > b)
    }

    pub fn ge(&self, other: impl Into<Arg<f64>>) -> Pending<bool> {
        self.combine(other, |a, b| a >= b)
    }

    pub fn eq_value(&self, other: impl Into<Arg<f64>>) -> Pending<bool> {
        self.combine(other, |a, b| a == b)
    }

    pub fn ne_value(&self, other: impl Into<Arg<f64>>) -> Pending<bool> {
        self.combine(other, |a, b| a != b)
    }
}

impl Pending<bool> {
    pub fn and(&self, other: impl Into<Arg<bool>>) -> Pending<bool> {
        self.combine(other, |a, b| a && b)
    }

    pub fn or(&self, other: impl Into<Arg<bool>>) -> Pending<bool> {
        self.combine(other, |a, b| a || b)
    }

    pub fn not(&self) -> Pending<bool> {
        self.then_map(|a| !a)
    }
}

/// An operation argument: a value now or the result of an earlier operation.
#[derive(Clone, Debug)]
pub enum Arg<T> {
    Ready(T),
    Pending(Pending<T>),
}

impl<T> Arg<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub async fn resolve(self) -> Result<T> {
        match self {
            Arg::Ready(value) => Ok(value),
            Arg::Pending(pending) => pending.await,
        }
    }
}

impl<T> From<T> for Arg<T> {
    fn from(value: T) -> Arg<T> {
        Arg::Ready(value)
    }
}

impl<T> From<Pending<T>> for Arg<T> {
    fn from(pending: Pending<T>) -> Arg<T> {
        Arg::Pending(pending)
    }
}

impl<T> From<&Pending<T>> for Arg<T> {
    fn from(pending: &Pending<T>) -> Arg<T> {
        Arg::Pending(pending.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn arithmetic_resolves_both_sides() {
        let a = Pending::ready(6.0);
        let b = Pending::ready(4.0);
        assert_eq!(a.add(&b).await, Ok(10.0));
        assert_eq!(a.sub(1.0).mul(&b).await, Ok(20.0));
        assert_eq!(a.pow(2.0).await, Ok(36.0));
        assert_eq!(a.rem(4.0).await, Ok(2.0));
        assert_eq!(a.gt(&b).and(a.lt(7.0)).await, Ok(true));
        assert_eq!(a.eq_value(&b).or(false).not().await, Ok(true));
    }

    #[tokio::test]
    async fn failures_propagate_to_every_consumer() {
        let failed: Pending<f64> = Pending::failed(TurtleError::ZeroStretch);
        let sum = Pending::ready(1.0).add(&failed);
        assert_eq!(sum.await, Err(TurtleError::ZeroStretch));
        assert_eq!(failed.neg().await, Err(TurtleError::ZeroStretch));
        assert_eq!(
            failed.try_map(|_| Ok(1u8)).await,
            Err(TurtleError::ZeroStretch)
        );
    }

    #[tokio::test]
    async fn peek_sees_settled_results() {
        let value = Pending::ready(3u32);
        assert!(value.peek().is_none());
        assert_eq!(value.clone().await, Ok(3));
        assert_eq!(value.peek(), Some(&Ok(3)));
        let all = Pending::all(vec![Pending::ready(1), value.then_map(|v| v * 2)]);
        assert_eq!(all.await, Ok(vec![1, 6]));
    }

    #[tokio::test]
    async fn combinators_apply_to_owned_values() {
        let owned = Pending::ready(4u32);
        let doubled = owned.clone().then_map(|v| v * 2);
        let checked = owned.try_map(|v| if v > 3 { Ok(v) } else { Err(TurtleError::ZeroStretch) });
        assert_eq!(doubled.await, Ok(8));
        assert_eq!(checked.await, Ok(4));
        // FutureExt::map still sees the whole result
        assert!(Pending::ready(1u8).map(|result| result.is_ok()).await);
    }
}
