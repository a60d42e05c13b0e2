// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The cross-thread hand-off from the inbound transport to the router.

use flowgate_core::{UnixNanos, datetime::unix_nanos_now};
use flowgate_model::CommandEnvelope;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// A command accepted by the inbound transport, stamped with its acceptance time.
#[derive(Clone, Debug)]
pub struct InboundCommand {
    pub envelope: CommandEnvelope,
    pub ts_accepted: UnixNanos,
}

/// The producer side of a router's inbound channel.
///
/// Cloneable and `Send`, so the thread draining the transport can own one while the
/// dispatcher thread owns the router.
#[derive(Clone, Debug)]
pub struct CommandSender {
    tx: UnboundedSender<InboundCommand>,
}

impl CommandSender {
    /// Sends `envelope`, accepted at `ts_accepted`, to the router.
    ///
    /// # Errors
    ///
    /// Returns an error if the router has been dropped.
    pub fn send(&self, envelope: CommandEnvelope, ts_accepted: UnixNanos) -> anyhow::Result<()> {
        let request_id = envelope.request_id;
        self.tx
            .send(InboundCommand {
                envelope,
                ts_accepted,
            })
            .map_err(|_| anyhow::anyhow!("Router closed, dropped request {request_id}"))
    }

    /// Sends `envelope` stamped with the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns an error if the router has been dropped.
    pub fn send_now(&self, envelope: CommandEnvelope) -> anyhow::Result<()> {
        self.send(envelope, unix_nanos_now())
    }

    /// Returns `true` if the router has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub(crate) fn inbound_channel() -> (CommandSender, UnboundedReceiver<InboundCommand>) {
    let (tx, rx) = unbounded_channel();
    (CommandSender { tx }, rx)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use flowgate_model::stubs::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_send_receive(buy_600000_sh: CommandEnvelope) {
        let (sender, mut rx) = inbound_channel();
        let ts = UnixNanos::new(42);
        sender.send(buy_600000_sh.clone(), ts).unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.envelope, buy_600000_sh);
        assert_eq!(received.ts_accepted, ts);
        assert!(rx.try_recv().is_err());
    }

    #[rstest]
    fn test_send_from_another_thread(buy_600000_sh: CommandEnvelope) {
        let (sender, mut rx) = inbound_channel();
        let handle = std::thread::spawn({
            let sender = sender.clone();
            move || sender.send_now(buy_600000_sh)
        });
        handle.join().unwrap().unwrap();
        assert_eq!(rx.try_recv().unwrap().envelope.request_id, 1);
    }

    #[rstest]
    fn test_send_after_close_fails(buy_600000_sh: CommandEnvelope) {
        let (sender, rx) = inbound_channel();
        drop(rx);
        assert!(sender.is_closed());
        assert!(sender.send_now(buy_600000_sh).is_err());
    }
}
