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


//! MPI communicator
//!
//! Blocking, tagged point-to-point messages over `MPI_COMM_WORLD` using the
//! rsmpi 0.8 API.

use std::sync::{Arc, Mutex};

use mpi::environment::Universe;
use mpi::traits::{Communicator as MpiCommunicator, Destination, Source};

use crate::error::{ExchangeError, ExchangeResult};
use crate::net::{CommType, Communicator};

/// MPI Communicator
/// Stores the `Universe` so MPI stays initialized for the communicator's lifetime
pub struct MPICommunicator {
    rank: usize,
    world_size: usize,
    universe: Arc<Mutex<Option<Universe>>>,
}

impl MPICommunicator {
    /// Initialize MPI and wrap the world communicator
    pub fn make() -> ExchangeResult<Arc<dyn Communicator>> {
        let universe = mpi::initialize().ok_or_else(|| {
            ExchangeError::ChannelFailure(
                "Failed to initialize MPI (already initialized or MPI library not found)".to_string(),
            )
        })?;

        let world = universe.world();
        let rank = world.rank();
        let world_size = world.size();

        if rank < 0 || world_size < 1 || rank >= world_size {
            return Err(ExchangeError::ChannelFailure(format!(
                "Malformed rank: {} or world size: {}",
                rank, world_size
            )));
        }

        Ok(Arc::new(Self {
            rank: rank as usize,
            world_size: world_size as usize,
            universe: Arc::new(Mutex::new(Some(universe))),
        }))
    }

    /// Finalize MPI by dropping the universe
    pub fn finalize(&self) -> ExchangeResult<()> {
        let mut universe = self.universe.lock().map_err(|_| {
            ExchangeError::ChannelFailure("MPI universe lock is poisoned".to_string())
        })?;
        *universe = None;
        Ok(())
    }

    fn with_world<R>(&self, f: impl FnOnce(&mpi::topology::SimpleCommunicator) -> R) -> ExchangeResult<R> {
        let guard = self.universe.lock().map_err(|_| {
            ExchangeError::ChannelFailure("MPI universe lock is poisoned".to_string())
        })?;
        let universe = guard
            .as_ref()
            .ok_or_else(|| ExchangeError::ChannelFailure("MPI not initialized".to_string()))?;
        let world = universe.world();
        Ok(f(&world))
    }

    fn check_peer(&self, peer: usize) -> ExchangeResult<i32> {
        if peer >= self.world_size {
            return Err(ExchangeError::ChannelFailure(format!(
                "peer {} is outside a world of size {}",
                peer, self.world_size
            )));
        }
        Ok(peer as i32)
    }
}

// SAFETY: every MPI call goes through the universe mutex, so at most one
// thread talks to MPI at a time
unsafe impl Send for MPICommunicator {}
unsafe impl Sync for MPICommunicator {}

impl Communicator for MPICommunicator {
    fn get_rank(&self) -> usize {
        self.rank
    }

    fn get_world_size(&self) -> usize {
        self.world_size
    }

    fn get_comm_type(&self) -> CommType {
        CommType::Mpi
    }

    fn barrier(&self) -> ExchangeResult<()> {
        self.with_world(|world| world.barrier())
    }

    fn send(&self, data: &[u8], dest: usize, tag: i32) -> ExchangeResult<()> {
        let dest = self.check_peer(dest)?;
        self.with_world(|world| world.process_at_rank(dest).send_with_tag(data, tag))
    }

    fn recv(&self, buffer: &mut Vec<u8>, source: usize, tag: i32) -> ExchangeResult<()> {
        let source = self.check_peer(source)?;
        let (msg, _status) =
            self.with_world(|world| world.process_at_rank(source).receive_vec_with_tag::<u8>(tag))?;
        *buffer = msg;
        Ok(())
    }
}
