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

//! Sum reductions over pairwise exchanges
//!
//! Three schedules are provided:
//!
//! - [`all_reduce_sum`]: butterfly, every peer ends with the sum.
//! - [`tree_reduce_sum`]: recursive halving, only ordinal 0 ends with the sum.
//! - [`binomial_reduce_sum`]: XOR pairs where the upper peer sends and
//!   terminates, only ordinal 0 ends with the sum.
//!
//! Floating-point sums are reproducible for a fixed group size and schedule,
//! but will generally differ in rounding from a left-to-right sum and between
//! group sizes.

use std::fmt::Debug;
use std::ops::Add;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ctx::ExchangeContext;
use crate::error::{ExchangeError, ExchangeResult};
use crate::net::message::OpKind;
use crate::ops::participant::Participant;
use crate::topology::{
    binomial_role, butterfly_fold, butterfly_partner, butterfly_rounds, is_power_of_two,
    largest_power_of_two_at_most, FoldRole, Topology,
};

/// A value that can be summed across peers
pub trait Summable: Copy + Add<Output = Self> + Serialize + DeserializeOwned + Debug {}

impl<T> Summable for T where T: Copy + Add<Output = T> + Serialize + DeserializeOwned + Debug {}

/// Outcome of a reduction at one peer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReductionResult<T> {
    /// Symmetric schedule: every peer holds the full result
    Complete(T),
    /// Rooted schedule: this peer is the root and holds the full result
    Root(T),
    /// Rooted schedule: this peer handed its value on; it holds no answer
    Inactive,
}

impl<T> ReductionResult<T> {
    /// The result, if this peer holds it
    pub fn value(&self) -> Option<&T> {
        match self {
            ReductionResult::Complete(v) | ReductionResult::Root(v) => Some(v),
            ReductionResult::Inactive => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            ReductionResult::Complete(v) | ReductionResult::Root(v) => Some(v),
            ReductionResult::Inactive => None,
        }
    }

    pub fn is_answer(&self) -> bool {
        !matches!(self, ReductionResult::Inactive)
    }
}

fn add<T: Summable>(a: T, b: T) -> T {
    a + b
}

/// Butterfly all-reduce: every peer returns the sum of all contributions.
///
/// For a power-of-two group every round pairs each peer with
/// `ordinal ^ (1 << step)`. Otherwise the peers above the largest power of
/// two `p2` first fold their value into `ordinal - p2`, the core `[0, p2)`
/// runs the butterfly rounds, and the result is sent back to the folded
/// peers. A plain XOR schedule with idle rounds would leave some peers
/// without the contributions of the top ones.
///
/// # Arguments
/// * `ctx` - Exchange context of this peer
/// * `value` - This peer's contribution
///
/// # Returns
/// The group sum, identical at every peer
pub fn all_reduce_sum<T: Summable>(ctx: &ExchangeContext, value: T) -> ExchangeResult<T> {
    let size = ctx.get_world_size();
    let ordinal = ctx.get_rank();
    let mut participant = Participant::new(ctx, OpKind::AllReduce, value);
    if size == 1 {
        return Ok(value);
    }

    let core = largest_power_of_two_at_most(size);
    let rounds = butterfly_rounds(core);
    let fold = butterfly_fold(ordinal, size);
    log::debug!(
        "P{} all-reduce #{}: {} peers, core {}, {:?}",
        ordinal,
        participant.sequence(),
        size,
        core,
        fold
    );

    // round 0 folds the excess peers in, round rounds + 1 answers them
    match fold {
        FoldRole::Extra { core } => participant.send_value(core, 0)?,
        FoldRole::CoreWithExtra { extra } => participant.receive_and_combine(extra, 0, add)?,
        FoldRole::Core => participant.idle(0),
    }

    if !matches!(fold, FoldRole::Extra { .. }) {
        for step in 0..rounds {
            match butterfly_partner(ordinal, core, step) {
                Some(partner) => participant.exchange_and_combine(partner, step + 1, add)?,
                None => participant.idle(step + 1),
            }
        }
    }

    match fold {
        FoldRole::Extra { core } => participant.receive_value(core, rounds + 1)?,
        FoldRole::CoreWithExtra { extra } => participant.send_value(extra, rounds + 1)?,
        FoldRole::Core => {}
    }

    participant.into_value().ok_or_else(|| {
        ExchangeError::PreconditionViolation(format!("P{} lost its value during all-reduce", ordinal))
    })
}

/// Recursive-halving reduction to ordinal 0.
///
/// Each round keeps the lower `ceil(c / 2)` peers of the active range
/// `[0, c)`; the rest send their partial sum down and terminate. No
/// contribution is dropped for odd `c`.
pub fn tree_reduce_sum<T: Summable>(ctx: &ExchangeContext, value: T) -> ExchangeResult<ReductionResult<T>> {
    let size = ctx.get_world_size();
    let ordinal = ctx.get_rank();
    let mut participant = Participant::new(ctx, OpKind::TreeReduce, value);
    participant.run_rooted(
        Topology::Tree.rounds(size),
        |step| Topology::Tree.role(ordinal, size, step),
        add,
        |_, _, _| {},
    )?;
    Ok(finish_rooted(ordinal, participant))
}

/// XOR-pair reduction to ordinal 0.
///
/// In round `d` peer `o` pairs with `o ^ (1 << d)`; the lower of the two
/// receives, the upper sends and terminates. Works for any group size.
pub fn binomial_reduce_sum<T: Summable>(ctx: &ExchangeContext, value: T) -> ExchangeResult<ReductionResult<T>> {
    let size = ctx.get_world_size();
    let ordinal = ctx.get_rank();
    let mut participant = Participant::new(ctx, OpKind::BinomialReduce, value);
    participant.run_rooted(
        butterfly_rounds(size),
        |step| binomial_role(ordinal, size, step),
        add,
        |_, _, _| {},
    )?;
    Ok(finish_rooted(ordinal, participant))
}

/// Sum with the topology chosen in the context's configuration
pub fn reduce_sum<T: Summable>(ctx: &ExchangeContext, value: T) -> ExchangeResult<ReductionResult<T>> {
    let topology = ctx.config().reduce_topology;
    if ctx.get_rank() == 0 {
        log::debug!(
            "reduce_sum over {} peers ({}a power of two) with {:?}",
            ctx.get_world_size(),
            if is_power_of_two(ctx.get_world_size()) { "" } else { "not " },
            topology
        );
    }
    match topology {
        Topology::Butterfly => Ok(ReductionResult::Complete(all_reduce_sum(ctx, value)?)),
        Topology::Tree => tree_reduce_sum(ctx, value),
    }
}

fn finish_rooted<T: Summable>(ordinal: usize, participant: Participant<'_, T>) -> ReductionResult<T> {
    match participant.into_value() {
        Some(v) if ordinal == 0 => {
            crate::exchange_info!("P0 holds reduction result {:?}", v);
            ReductionResult::Root(v)
        }
        _ => ReductionResult::Inactive,
    }
}
