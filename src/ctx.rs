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

//! Exchange context
//!
//! The entry point to every collective: who this peer is, how it talks to
//! the others, and the configuration shared by the group.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ExchangeConfig;
use crate::error::ExchangeResult;
use crate::net::{Communicator, LocalCommunicator};
use crate::peer::{Group, PeerHandle};

pub struct ExchangeContext {
    handle: PeerHandle,
    communicator: Arc<dyn Communicator>,
    config: ExchangeConfig,
    sequence_no: AtomicU64,
}

impl ExchangeContext {
    /// Build a context from a communicator.
    ///
    /// The group size and ordinal come from the communicator and are
    /// validated here, before any communication happens.
    pub fn new(communicator: Arc<dyn Communicator>, config: ExchangeConfig) -> ExchangeResult<Self> {
        config.validate()?;
        let group = Group::new(communicator.get_world_size())?;
        let handle = PeerHandle::new(communicator.get_rank(), group)?;
        Ok(Self {
            handle,
            communicator,
            config,
            sequence_no: AtomicU64::new(0),
        })
    }

    pub fn init(communicator: Arc<dyn Communicator>, config: ExchangeConfig) -> ExchangeResult<Arc<Self>> {
        Ok(Arc::new(Self::new(communicator, config)?))
    }

    /// A group of one, for running collectives without any peers
    pub fn init_local() -> ExchangeResult<Arc<Self>> {
        let mut comms = LocalCommunicator::create_group(1)?;
        let comm = comms.remove(0);
        Self::init(Arc::new(comm), ExchangeConfig::default())
    }

    pub fn handle(&self) -> PeerHandle {
        self.handle
    }

    pub fn get_rank(&self) -> usize {
        self.handle.ordinal()
    }

    pub fn get_world_size(&self) -> usize {
        self.handle.size()
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn get_communicator(&self) -> &Arc<dyn Communicator> {
        &self.communicator
    }

    /// Sequence number for the next collective call.
    ///
    /// Peers invoke collectives in the same order, so matching sequence
    /// numbers on both ends of a message confirm they are in the same call.
    pub fn get_next_sequence(&self) -> u64 {
        self.sequence_no.fetch_add(1, Ordering::SeqCst)
    }

    pub fn barrier(&self) -> ExchangeResult<()> {
        self.communicator.barrier()
    }
}
