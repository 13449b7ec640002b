// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crossbeam_channel::{Receiver, Sender};

/// A convenience struct to bundle both halves of a bounded
/// [crossbeam_channel] together.
///
/// The producing thread takes `sender`; the consuming side keeps `receiver`
/// and drains it fully once per frame. Dropping the receiver doubles as the
/// shutdown signal, because the producer's next send fails.
#[derive(Debug)]
pub struct ChannelPair<T> {
    #[allow(missing_docs)]
    pub sender: Sender<T>,
    #[allow(missing_docs)]
    pub receiver: Receiver<T>,
}
impl<T> ChannelPair<T> {
    /// Creates a channel that holds at most `capacity` in-flight items.
    pub fn new_bounded(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self { sender, receiver }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_receiver_fails_the_next_send() {
        let ChannelPair { sender, receiver } = ChannelPair::new_bounded(4);
        assert!(sender.send(1).is_ok());
        drop(receiver);
        assert!(sender.send(2).is_err());
    }
}
