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

//! An unthrottled FIFO for traffic that bypasses admission control.

use std::collections::VecDeque;

use flowgate_model::CommandEnvelope;

/// Holds queries, signals and commands for markets without flow control, released in
/// arrival order.
#[derive(Debug, Default)]
pub struct PassThroughQueue {
    queue: VecDeque<CommandEnvelope>,
}

impl PassThroughQueue {
    /// Creates a new empty [`PassThroughQueue`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, envelope: CommandEnvelope) {
        self.queue.push_back(envelope);
    }

    pub fn pop(&mut self) -> Option<CommandEnvelope> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
