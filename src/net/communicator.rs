// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Communicator trait
//!
//! Every backend must deliver messages between a pair of peers reliably,
//! exactly once, in order and with message boundaries preserved. All calls
//! block.

use crate::error::ExchangeResult;

use super::CommType;

/// Point-to-point channel between the peers of one group
pub trait Communicator: Send + Sync {
    fn get_rank(&self) -> usize;
    fn get_world_size(&self) -> usize;
    fn get_comm_type(&self) -> CommType;

    fn barrier(&self) -> ExchangeResult<()>;

    /// Send data to a specific peer
    ///
    /// # Arguments
    /// * `data` - The data to send
    /// * `dest` - The destination ordinal
    /// * `tag` - Message tag for identification
    fn send(&self, data: &[u8], dest: usize, tag: i32) -> ExchangeResult<()>;

    /// Receive data from a specific peer
    ///
    /// # Arguments
    /// * `buffer` - Buffer to store received data, replaced on success
    /// * `source` - The source ordinal
    /// * `tag` - Message tag for identification
    fn recv(&self, buffer: &mut Vec<u8>, source: usize, tag: i32) -> ExchangeResult<()>;

    /// Send `data` to `partner` and receive the partner's message in the
    /// same round.
    ///
    /// The default orders the two halves by ordinal, lower peer sends first,
    /// so that backends with rendezvous sends do not deadlock.
    fn exchange(&self, data: &[u8], partner: usize, tag: i32) -> ExchangeResult<Vec<u8>> {
        let mut incoming = Vec::new();
        if self.get_rank() < partner {
            self.send(data, partner, tag)?;
            self.recv(&mut incoming, partner, tag)?;
        } else {
            self.recv(&mut incoming, partner, tag)?;
            self.send(data, partner, tag)?;
        }
        Ok(incoming)
    }
}
