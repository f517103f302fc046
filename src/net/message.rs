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

//! Message envelope for collective rounds
//!
//! Each payload travels with a header naming the collective, its sequence
//! number, the round and the sender. The receiver knows all four in advance,
//! so any difference means the peers have drifted apart.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, ExchangeResult};

/// Collective operation a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    AllReduce,
    TreeReduce,
    BinomialReduce,
    DistributedSort,
}

/// Routing header of every collective message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub op: OpKind,
    pub sequence: u64,
    pub round: u32,
    pub source: usize,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}#{} round {} from P{}",
            self.op, self.sequence, self.round, self.source
        )
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    header: Header,
    body: &'a T,
}

/// A decoded message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub header: Header,
    pub body: T,
}

impl<T: Serialize> Envelope<T> {
    /// Encode `body` behind `header` without taking ownership of it
    pub fn encode(header: Header, body: &T) -> ExchangeResult<Vec<u8>> {
        Ok(bincode::serialize(&EnvelopeRef { header, body })?)
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    pub fn decode(bytes: &[u8]) -> ExchangeResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Fail with `ProtocolDesync` unless the header is exactly `expected`
    pub fn check(&self, expected: &Header) -> ExchangeResult<()> {
        if self.header != *expected {
            return Err(ExchangeError::ProtocolDesync(format!(
                "expected {}, got {}",
                expected, self.header
            )));
        }
        Ok(())
    }

    /// Decode, check the header and hand back the body
    pub fn open(bytes: &[u8], expected: &Header) -> ExchangeResult<T> {
        // header first, so a stray message with a different body type still
        // reports as a desync
        let header: Header = bincode::deserialize(bytes)?;
        if header != *expected {
            return Err(ExchangeError::ProtocolDesync(format!(
                "expected {}, got {}",
                expected, header
            )));
        }
        let envelope = Self::decode(bytes)?;
        envelope.check(expected)?;
        Ok(envelope.body)
    }
}
