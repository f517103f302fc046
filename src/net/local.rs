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

//! In-process communicator
//!
//! A full mesh of unbounded channels, one per ordered pair of peers, shared
//! by peers that run as threads of one process. Sends never block; receives
//! block until the partner's message arrives or the partner goes away.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use crate::config::ExchangeConfig;
use crate::ctx::ExchangeContext;
use crate::error::{ExchangeError, ExchangeResult};
use crate::peer::Group;

use super::{CommType, Communicator};

struct Frame {
    tag: i32,
    data: Vec<u8>,
}

/// One peer's end of an in-process mesh
pub struct LocalCommunicator {
    rank: usize,
    world_size: usize,
    // indexed by destination
    senders: Vec<Sender<Frame>>,
    // indexed by source
    receivers: Vec<Mutex<Receiver<Frame>>>,
    barrier: Arc<Barrier>,
}

impl LocalCommunicator {
    /// Build the mesh for a group of `size` peers, one communicator per ordinal
    pub fn create_group(size: usize) -> ExchangeResult<Vec<LocalCommunicator>> {
        let group = Group::new(size)?;
        let size = group.size();

        let mut senders: Vec<Vec<Sender<Frame>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut receivers: Vec<Vec<Mutex<Receiver<Frame>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();

        for src in 0..size {
            for dst in 0..size {
                let (tx, rx) = channel();
                senders[src].push(tx);
                receivers[dst].push(Mutex::new(rx));
            }
        }

        let barrier = Arc::new(Barrier::new(size));
        Ok(senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (senders, receivers))| LocalCommunicator {
                rank,
                world_size: size,
                senders,
                receivers,
                barrier: barrier.clone(),
            })
            .collect())
    }

    fn check_peer(&self, peer: usize) -> ExchangeResult<()> {
        if peer >= self.world_size {
            return Err(ExchangeError::ChannelFailure(format!(
                "peer {} is outside a group of size {}",
                peer, self.world_size
            )));
        }
        Ok(())
    }
}

impl Communicator for LocalCommunicator {
    fn get_rank(&self) -> usize {
        self.rank
    }

    fn get_world_size(&self) -> usize {
        self.world_size
    }

    fn get_comm_type(&self) -> CommType {
        CommType::Local
    }

    fn barrier(&self) -> ExchangeResult<()> {
        self.barrier.wait();
        Ok(())
    }

    fn send(&self, data: &[u8], dest: usize, tag: i32) -> ExchangeResult<()> {
        self.check_peer(dest)?;
        self.senders[dest]
            .send(Frame {
                tag,
                data: data.to_vec(),
            })
            .map_err(|_| {
                ExchangeError::ChannelFailure(format!(
                    "P{} cannot send to P{}: peer has left the group",
                    self.rank, dest
                ))
            })
    }

    fn recv(&self, buffer: &mut Vec<u8>, source: usize, tag: i32) -> ExchangeResult<()> {
        self.check_peer(source)?;
        let rx = self.receivers[source].lock().map_err(|_| {
            ExchangeError::ChannelFailure(format!("receive queue from P{} is poisoned", source))
        })?;
        let frame = rx.recv().map_err(|_| {
            ExchangeError::ChannelFailure(format!(
                "P{} cannot receive from P{}: peer has left the group",
                self.rank, source
            ))
        })?;
        if frame.tag != tag {
            return Err(ExchangeError::ProtocolDesync(format!(
                "P{} expected tag {} from P{}, got {}",
                self.rank, tag, source, frame.tag
            )));
        }
        *buffer = frame.data;
        Ok(())
    }
}

/// Run `f` once per peer of a fresh in-process group, each on its own thread.
///
/// Returns the per-ordinal results. If any peer fails, the whole run fails;
/// the error reported is the first one that is not a knock-on channel failure
/// of a partner leaving early.
pub fn run_on_local_group<F, R>(size: usize, config: ExchangeConfig, f: F) -> ExchangeResult<Vec<R>>
where
    F: Fn(Arc<ExchangeContext>) -> ExchangeResult<R> + Sync,
    R: Send,
{
    config.validate()?;
    let contexts = LocalCommunicator::create_group(size)?
        .into_iter()
        .map(|comm| ExchangeContext::init(Arc::new(comm), config.clone()))
        .collect::<ExchangeResult<Vec<_>>>()?;

    let results: Vec<ExchangeResult<R>> = thread::scope(|scope| {
        let f = &f;
        let handles: Vec<_> = contexts
            .into_iter()
            .map(|ctx| scope.spawn(move || f(ctx)))
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(ordinal, handle)| {
                handle.join().unwrap_or_else(|_| {
                    Err(ExchangeError::ChannelFailure(format!("peer P{} panicked", ordinal)))
                })
            })
            .collect()
    });

    let mut values = Vec::with_capacity(results.len());
    let mut first_error: Option<ExchangeError> = None;
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(e) => {
                let replace = match &first_error {
                    None => true,
                    Some(ExchangeError::ChannelFailure(_)) => !matches!(e, ExchangeError::ChannelFailure(_)),
                    Some(_) => false,
                };
                if replace {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => {
            crate::exchange_error!("local group of {} peers failed: {}", size, e);
            Err(e)
        }
        None => Ok(values),
    }
}
