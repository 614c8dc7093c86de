// tortuga/turtle/src/undo.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bounded history of applied operations.
//!
//! Entries are kept for introspection only; replaying them is not supported.

use std::collections::VecDeque;

/// A record of one applied mutating operation.
#[derive(Clone, Debug, PartialEq)]
pub struct UndoEntry {
    pub op: &'static str,
}

#[derive(Clone, Debug, Default)]
pub struct UndoBuffer {
    entries: VecDeque<UndoEntry>,
    capacity: Option<usize>,
}

impl UndoBuffer {
    /// `None` or zero capacity disables history.
    pub fn new(capacity: Option<usize>) -> UndoBuffer {
        let mut buffer = UndoBuffer::default();
        buffer.set_capacity(capacity);
        buffer
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity.is_some()
    }

    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity.filter(|&n| n > 0);
        match self.capacity {
            None => self.entries.clear(),
            Some(n) => {
                while self.entries.len() > n {
                    self.entries.pop_front();
                }
            }
        }
    }

    pub fn push(&mut self, entry: UndoEntry) {
        let capacity = match self.capacity {
            Some(n) => n,
            None => return,
        };
        if self.entries.len() == capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &UndoEntry> {
        self.entries.iter()
    }
}
