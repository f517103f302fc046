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

//! Peer identity within a fixed-size group

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, ExchangeResult};

/// A fixed-size group of peers. Every peer of a run holds the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Group {
    size: usize,
}

impl Group {
    /// Create a group, rejecting empty groups
    pub fn new(size: usize) -> ExchangeResult<Self> {
        if size < 1 {
            return Err(ExchangeError::InvalidGroupSize(size));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if the group size is a power of two
    pub fn is_power_of_two(&self) -> bool {
        crate::topology::is_power_of_two(self.size)
    }
}

/// Identity of "self" for all partner computations. Immutable for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerHandle {
    ordinal: usize,
    group: Group,
}

impl PeerHandle {
    pub fn new(ordinal: usize, group: Group) -> ExchangeResult<Self> {
        if ordinal >= group.size() {
            return Err(ExchangeError::InvalidOrdinal {
                ordinal,
                size: group.size(),
            });
        }
        Ok(Self { ordinal, group })
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn size(&self) -> usize {
        self.group.size()
    }

    /// The root that holds root-only results
    pub fn is_root(&self) -> bool {
        self.ordinal == 0
    }
}

impl fmt::Display for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:02}/{}", self.ordinal, self.group.size())
    }
}

/// What a peer does in one round. Recomputed every round, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerRole {
    /// Sends its value and receives the partner's in the same round
    Exchanging { partner: usize },
    /// Receives the partner's value and absorbs it
    ActiveReceiver { partner: usize },
    /// Sends its value to the partner, then terminates
    SenderTerminal { partner: usize },
    /// No partner this round; keeps its value unchanged
    IdleNoPartner,
    /// Already terminated in an earlier round
    Terminated,
}

impl PeerRole {
    pub fn partner(&self) -> Option<usize> {
        match *self {
            PeerRole::Exchanging { partner }
            | PeerRole::ActiveReceiver { partner }
            | PeerRole::SenderTerminal { partner } => Some(partner),
            PeerRole::IdleNoPartner | PeerRole::Terminated => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, PeerRole::Terminated)
    }
}

/// Per-peer lifecycle of an owned partial value or sorted run.
///
/// Once `Terminated` the value has been transmitted and must not be read or
/// written again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerState<V> {
    Active(V),
    Terminated,
}

impl<V> PeerState<V> {
    pub fn is_active(&self) -> bool {
        matches!(self, PeerState::Active(_))
    }

    pub fn as_active(&self) -> Option<&V> {
        match self {
            PeerState::Active(v) => Some(v),
            PeerState::Terminated => None,
        }
    }

    /// Take the value out, leaving the state terminated
    pub fn take(&mut self) -> Option<V> {
        match std::mem::replace(self, PeerState::Terminated) {
            PeerState::Active(v) => Some(v),
            PeerState::Terminated => None,
        }
    }

    pub fn into_active(self) -> Option<V> {
        match self {
            PeerState::Active(v) => Some(v),
            PeerState::Terminated => None,
        }
    }
}
