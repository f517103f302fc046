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

//! One peer's side of a collective
//!
//! A `Participant` owns the peer's current value for the duration of one
//! collective call and performs the per-round primitives on it. Sending the
//! value away moves it out and leaves the participant `Terminated`; every
//! primitive refuses to run after that.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ctx::ExchangeContext;
use crate::error::{ExchangeError, ExchangeResult};
use crate::net::message::{Envelope, Header, OpKind};
use crate::peer::{PeerRole, PeerState};

pub struct Participant<'a, V> {
    ctx: &'a ExchangeContext,
    op: OpKind,
    sequence: u64,
    state: PeerState<V>,
}

impl<'a, V> Participant<'a, V>
where
    V: Serialize + DeserializeOwned,
{
    /// Start a collective call, claiming the next sequence number
    pub fn new(ctx: &'a ExchangeContext, op: OpKind, value: V) -> Self {
        Self {
            ctx,
            op,
            sequence: ctx.get_next_sequence(),
            state: PeerState::Active(value),
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ctx.get_rank()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn value(&self) -> Option<&V> {
        self.state.as_active()
    }

    pub fn into_value(self) -> Option<V> {
        self.state.into_active()
    }

    fn header(&self, round: u32, source: usize) -> Header {
        Header {
            op: self.op,
            sequence: self.sequence,
            round,
            source,
        }
    }

    fn tag(&self) -> i32 {
        self.ctx.config().tag
    }

    fn terminated(&self, action: &str, partner: usize) -> ExchangeError {
        ExchangeError::PreconditionViolation(format!(
            "P{} already sent its value in {:?}#{} and cannot {} P{}",
            self.ordinal(),
            self.op,
            self.sequence,
            action,
            partner
        ))
    }

    fn active_value(&self, action: &str, partner: usize) -> ExchangeResult<&V> {
        self.state
            .as_active()
            .ok_or_else(|| self.terminated(action, partner))
    }

    fn take_value(&mut self, action: &str, partner: usize) -> ExchangeResult<V> {
        if !self.state.is_active() {
            return Err(self.terminated(action, partner));
        }
        self.state.take().ok_or_else(|| self.terminated(action, partner))
    }

    fn trace(&self, round: u32, role: PeerRole) {
        if self.ctx.config().log_rounds {
            log::debug!(
                "P{} {:?}#{} round {}: {:?}",
                self.ordinal(),
                self.op,
                self.sequence,
                round,
                role
            );
        }
    }

    /// Send the current value to `partner` and receive the partner's in the
    /// same round, replacing the value with `combine(own, received)`
    pub fn exchange_and_combine<F>(&mut self, partner: usize, round: u32, combine: F) -> ExchangeResult<()>
    where
        F: FnOnce(V, V) -> V,
    {
        self.trace(round, PeerRole::Exchanging { partner });
        let outgoing = Envelope::encode(self.header(round, self.ordinal()), self.active_value("exchange with", partner)?)?;
        let incoming = self
            .ctx
            .get_communicator()
            .exchange(&outgoing, partner, self.tag())?;
        let received: V = Envelope::open(&incoming, &self.header(round, partner))?;
        let own = self.take_value("exchange with", partner)?;
        self.state = PeerState::Active(combine(own, received));
        Ok(())
    }

    /// Receive the partner's value and absorb it with `combine(own, received)`
    pub fn receive_and_combine<F>(&mut self, partner: usize, round: u32, combine: F) -> ExchangeResult<()>
    where
        F: FnOnce(V, V) -> V,
    {
        self.trace(round, PeerRole::ActiveReceiver { partner });
        self.active_value("receive from", partner)?;
        let received = self.receive_body(partner, round)?;
        let own = self.take_value("receive from", partner)?;
        self.state = PeerState::Active(combine(own, received));
        Ok(())
    }

    /// Hand the value to `partner` and terminate.
    ///
    /// Ownership of the value ends here; the participant must not take part
    /// in any later round of this call.
    pub fn send_and_terminate(&mut self, partner: usize, round: u32) -> ExchangeResult<()> {
        self.trace(round, PeerRole::SenderTerminal { partner });
        let value = self.take_value("send to", partner)?;
        let outgoing = Envelope::encode(self.header(round, self.ordinal()), &value)?;
        drop(value);
        self.ctx
            .get_communicator()
            .send(&outgoing, partner, self.tag())
    }

    /// Send a copy of the value without giving it up
    pub fn send_value(&self, partner: usize, round: u32) -> ExchangeResult<()> {
        let outgoing = Envelope::encode(self.header(round, self.ordinal()), self.active_value("send to", partner)?)?;
        self.ctx
            .get_communicator()
            .send(&outgoing, partner, self.tag())
    }

    /// Replace the value with the one `partner` sends
    pub fn receive_value(&mut self, partner: usize, round: u32) -> ExchangeResult<()> {
        self.active_value("receive from", partner)?;
        let received = self.receive_body(partner, round)?;
        self.state = PeerState::Active(received);
        Ok(())
    }

    /// Drive a rooted schedule: in every round the lower peer of a pair
    /// absorbs the upper one, which sends and terminates.
    ///
    /// `role_at` maps a step to this peer's role. Once terminated the peer
    /// only counts the remaining rounds off. `observe` sees the role and the
    /// value held at the end of every round.
    pub fn run_rooted<R, F, O>(&mut self, rounds: u32, role_at: R, combine: F, mut observe: O) -> ExchangeResult<()>
    where
        R: Fn(u32) -> PeerRole,
        F: Fn(V, V) -> V,
        O: FnMut(u32, PeerRole, Option<&V>),
    {
        for step in 0..rounds {
            let role = if self.is_active() {
                role_at(step)
            } else {
                PeerRole::Terminated
            };
            match role {
                PeerRole::ActiveReceiver { partner } => {
                    self.receive_and_combine(partner, step, &combine)?
                }
                PeerRole::SenderTerminal { partner } => self.send_and_terminate(partner, step)?,
                PeerRole::Exchanging { partner } => {
                    return Err(ExchangeError::Invalid(format!(
                        "P{} got a symmetric exchange with P{} in a rooted schedule",
                        self.ordinal(),
                        partner
                    )))
                }
                PeerRole::IdleNoPartner | PeerRole::Terminated => self.idle(step),
            }
            observe(step, role, self.value());
        }
        Ok(())
    }

    /// Record that this round has nothing to do for this peer
    pub fn idle(&self, round: u32) {
        let role = if self.is_active() {
            PeerRole::IdleNoPartner
        } else {
            PeerRole::Terminated
        };
        self.trace(round, role);
    }

    fn receive_body(&self, partner: usize, round: u32) -> ExchangeResult<V> {
        let mut incoming = Vec::new();
        self.ctx
            .get_communicator()
            .recv(&mut incoming, partner, self.tag())?;
        Envelope::open(&incoming, &self.header(round, partner)).map_err(|e| {
            crate::exchange_warn!("P{} {:?}#{} round {}: {}", self.ordinal(), self.op, self.sequence, round, e);
            e
        })
    }
}
