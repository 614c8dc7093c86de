// tortuga/turtle/src/dialog.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Modal input dialogs.

use futures::future::{BoxFuture, FutureExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextInput {
    pub title: String,
    pub prompt: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumInput {
    pub title: String,
    pub prompt: String,
    pub default: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Host UI that asks the user for input. `None` means cancelled.
pub trait Dialog: Send + Sync {
    fn text_input(&self, request: TextInput) -> BoxFuture<'static, Option<String>>;
    fn num_input(&self, request: NumInput) -> BoxFuture<'static, Option<f64>>;
}

/// Allows one open dialog at a time.
///
/// A second request while one is open is not an error: it logs a warning
/// and yields `None`. Numeric answers outside `[min, max]` are treated the
/// same way.
#[derive(Clone)]
pub struct DialogGuard {
    inner: Arc<dyn Dialog>,
    open: Arc<AtomicBool>,
}

struct OpenDialog(Arc<AtomicBool>);

impl Drop for OpenDialog {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl DialogGuard {
    pub fn new(inner: Arc<dyn Dialog>) -> DialogGuard {
        DialogGuard {
            inner,
            open: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn acquire(&self, title: &str) -> Option<OpenDialog> {
        if self.open.swap(true, Ordering::SeqCst) {
            warn!("dialog '{}' ignored: another dialog is already open", title);
            return None;
        }
        Some(OpenDialog(self.open.clone()))
    }

    pub async fn text_input(&self, request: TextInput) -> Option<String> {
        let _open = self.acquire(&request.title)?;
        self.inner.text_input(request).await
    }

    pub async fn num_input(&self, request: NumInput) -> Option<f64> {
        let _open = self.acquire(&request.title)?;
        let (min, max) = (request.min, request.max);
        let answer = self.inner.num_input(request).await?;
        let in_range = min.map_or(true, |min| answer >= min) && max.map_or(true, |max| answer <= max);
        if !in_range {
            warn!(
                "answer {} outside [{}, {}]",
                answer,
                min.unwrap_or(f64::NEG_INFINITY),
                max.unwrap_or(f64::INFINITY)
            );
            return None;
        }
        Some(answer)
    }
}

/// Always cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDialog;

impl Dialog for NoDialog {
    fn text_input(&self, _: TextInput) -> BoxFuture<'static, Option<String>> {
        async { None }.boxed()
    }

    fn num_input(&self, _: NumInput) -> BoxFuture<'static, Option<f64>> {
        async { None }.boxed()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Number(f64),
    Cancel,
}

/// Answers from a list of canned replies, optionally after a delay.
///
/// A text request takes the next reply as text, a numeric request parses
/// it. An exhausted script cancels.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDialog {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    delay: Duration,
}

impl ScriptedDialog {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> ScriptedDialog {
        ScriptedDialog {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> ScriptedDialog {
        self.delay = delay;
        self
    }

    pub fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    fn next(&self) -> BoxFuture<'static, Reply> {
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Reply::Cancel);
        let delay = self.delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            reply
        }
        .boxed()
    }
}

impl Dialog for ScriptedDialog {
    fn text_input(&self, _: TextInput) -> BoxFuture<'static, Option<String>> {
        self.next()
            .map(|reply| match reply {
                Reply::Text(text) => Some(text),
                Reply::Number(number) => Some(number.to_string()),
                Reply::Cancel => None,
            })
            .boxed()
    }

    fn num_input(&self, _: NumInput) -> BoxFuture<'static, Option<f64>> {
        self.next()
            .map(|reply| match reply {
                Reply::Number(number) => Some(number),
                Reply::Text(text) => text.trim().parse().ok(),
                Reply::Cancel => None,
            })
            .boxed()
    }
}
