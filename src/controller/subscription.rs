//! State subscriptions
//!
//! Each subscriber owns an unbounded queue, so slow consumers never miss a
//! transition.

use super::types::PageState;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Stream of page states delivered to one subscriber
///
/// Starts with the state current at subscription time, then yields every
/// later transition in emission order. Ends when the controller is disposed
/// or dropped.
#[derive(Debug)]
pub struct PageStateStream<T> {
    receiver: mpsc::UnboundedReceiver<PageState<T>>,
}

impl<T> PageStateStream<T> {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<PageState<T>>) -> Self {
        Self { receiver }
    }

    /// Wait for the next state; `None` once the controller is gone
    pub async fn next_state(&mut self) -> Option<PageState<T>> {
        self.receiver.recv().await
    }

    /// Next state if one is already queued
    pub fn try_next_state(&mut self) -> Option<PageState<T>> {
        self.receiver.try_recv().ok()
    }

    /// Take every state queued so far without waiting
    pub fn drain(&mut self) -> Vec<PageState<T>> {
        let mut states = Vec::new();
        while let Ok(state) = self.receiver.try_recv() {
            states.push(state);
        }
        states
    }
}

impl<T> Stream for PageStateStream<T> {
    type Item = PageState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
