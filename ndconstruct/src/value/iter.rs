//! Pull cursor over a lazy source
//!
//! A `ValueIter` wraps a one-shot iterator. Look-ahead (peeking, draining for
//! type inference, buffering a positional record) moves elements into a
//! replay queue; `next` always serves the queue before pulling the source
//! again, so every element is observed exactly once and in source order.

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use super::Value;

pub struct ValueIter {
    /// `None` once the source has reported its end
    source: Option<Box<dyn Iterator<Item = Value>>>,
    replay: VecDeque<Value>,
    pulled: usize,
}

impl fmt::Debug for ValueIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueIter")
            .field("exhausted", &self.source.is_none())
            .field("buffered", &self.replay.len())
            .field("pulled", &self.pulled)
            .finish()
    }
}

impl ValueIter {
    pub fn new<I>(source: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Self {
            source: Some(Box::new(source.into_iter())),
            replay: VecDeque::new(),
            pulled: 0,
        }
    }

    fn pull(&mut self) -> Option<Value> {
        let next = self.source.as_mut()?.next();
        match next {
            Some(value) => {
                self.pulled += 1;
                Some(value)
            }
            None => {
                self.source = None;
                None
            }
        }
    }

    /// True once the source has ended; buffered elements may remain
    pub fn is_drained(&self) -> bool {
        self.source.is_none()
    }

    /// True when nothing is left to yield
    pub fn is_exhausted(&self) -> bool {
        self.source.is_none() && self.replay.is_empty()
    }

    /// Number of elements pulled from the source so far
    pub fn pulled(&self) -> usize {
        self.pulled
    }

    /// Number of elements waiting in the replay queue
    pub fn buffered(&self) -> usize {
        self.replay.len()
    }

    /// Remaining length, if the source has already ended
    pub fn known_len(&self) -> Option<usize> {
        self.is_drained().then_some(self.replay.len())
    }

    /// Look at the next element without consuming it
    pub fn peek_mut(&mut self) -> Option<&mut Value> {
        if self.replay.is_empty() {
            let value = self.pull()?;
            self.replay.push_back(value);
        }
        self.replay.front_mut()
    }

    /// Buffer up to `n` elements and return how many are buffered
    pub fn fill(&mut self, n: usize) -> usize {
        while self.replay.len() < n {
            match self.pull() {
                Some(value) => self.replay.push_back(value),
                None => break,
            }
        }
        self.replay.len()
    }

    /// Drain the whole source into the replay queue
    pub fn buffer_all(&mut self) -> &mut VecDeque<Value> {
        let before = self.replay.len();
        while let Some(value) = self.pull() {
            self.replay.push_back(value);
        }
        trace!(
            drained = self.replay.len() - before,
            total = self.replay.len(),
            "buffered iterator"
        );
        &mut self.replay
    }

    /// Mutable access to the buffered elements
    pub fn buffered_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.replay.iter_mut()
    }
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.replay.pop_front().or_else(|| self.pull())
    }
}
