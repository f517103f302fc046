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

//! Distributed sort using a binary merge tree
//!
//! # Algorithm
//! 1. **Local sort**: each peer sorts its own items
//! 2. **Merge rounds**: for `mask = 1, 2, 4, ...` while `mask < size`, peer
//!    `o` pairs with `o ^ mask`. The lower peer receives the partner's run and
//!    merges it into its own; the upper peer sends its run and terminates.
//!    A peer whose partner is outside the group waits for the next round.
//! 3. Ordinal 0 ends with every item of every peer in ascending order.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ctx::ExchangeContext;
use crate::error::{ExchangeError, ExchangeResult};
use crate::net::message::OpKind;
use crate::ops::merge::{is_ascending, merge_combine};
use crate::ops::participant::Participant;
use crate::peer::PeerRole;
use crate::topology::{binomial_role, butterfly_rounds};

/// An ascending run of items owned by one peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedRun<T> {
    items: Vec<T>,
    owner: usize,
}

impl<T: Ord> SortedRun<T> {
    /// Wrap an ascending run, rejecting one that is out of order
    pub fn new(items: Vec<T>, owner: usize) -> ExchangeResult<Self> {
        if !is_ascending(&items) {
            return Err(ExchangeError::PreconditionViolation(format!(
                "run for P{} is not in ascending order",
                owner
            )));
        }
        Ok(Self { items, owner })
    }
}

impl<T> SortedRun<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn owner(&self) -> usize {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What one peer did in one merge round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRecord {
    pub round: u32,
    pub role: PeerRole,
    /// Length of the run held after the round, 0 once terminated
    pub run_len: usize,
}

/// Result of a distributed sort at one peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome<T> {
    /// The fully merged run at the root, `None` everywhere else
    pub run: Option<SortedRun<T>>,
    pub rounds: Vec<RoundRecord>,
}

impl<T> SortOutcome<T> {
    pub fn is_root(&self) -> bool {
        self.run.is_some()
    }

    pub fn into_items(self) -> Option<Vec<T>> {
        self.run.map(SortedRun::into_items)
    }
}

/// Distributed sort with the standard library's stable sort as local sort
///
/// # Example
/// ```ignore
/// let outcome = distributed_sort(&ctx, vec![42, 7, 19])?;
/// if let Some(run) = outcome.run {
///     println!("{} items sorted", run.len());
/// }
/// ```
pub fn distributed_sort<T>(ctx: &ExchangeContext, items: Vec<T>) -> ExchangeResult<SortOutcome<T>>
where
    T: Ord + Serialize + DeserializeOwned,
{
    distributed_sort_with(ctx, items, |mut items| {
        items.sort();
        items
    })
}

/// Distributed sort with a caller-supplied local sort
///
/// # Arguments
/// * `ctx` - Exchange context of this peer
/// * `items` - This peer's private items
/// * `local_sort` - Sorts one peer's items ascending; its output is checked
///
/// # Returns
/// At ordinal 0 the merged run of all items of all peers; elsewhere no run.
/// Every peer also returns its per-round record.
pub fn distributed_sort_with<T, S>(ctx: &ExchangeContext, items: Vec<T>, local_sort: S) -> ExchangeResult<SortOutcome<T>>
where
    T: Ord + Serialize + DeserializeOwned,
    S: FnOnce(Vec<T>) -> Vec<T>,
{
    let size = ctx.get_world_size();
    let ordinal = ctx.get_rank();

    let sorted = local_sort(items);
    if !is_ascending(&sorted) {
        return Err(ExchangeError::PreconditionViolation(format!(
            "local sort on P{} returned {} items out of order",
            ordinal,
            sorted.len()
        )));
    }

    let rounds = butterfly_rounds(size);
    crate::exchange_debug!("P{} sorting {} local items, {} merge rounds", ordinal, sorted.len(), rounds);
    let mut records = Vec::with_capacity(rounds as usize);
    let mut participant = Participant::new(ctx, OpKind::DistributedSort, sorted);
    participant.run_rooted(
        rounds,
        |step| binomial_role(ordinal, size, step),
        merge_combine,
        |round, role, run: Option<&Vec<T>>| {
            records.push(RoundRecord {
                round,
                role,
                run_len: run.map_or(0, Vec::len),
            })
        },
    )?;

    let run = participant.into_value().map(|items| SortedRun { items, owner: ordinal });
    if let Some(run) = &run {
        crate::exchange_info!("P{} holds the merged run of {} items", ordinal, run.len());
    }
    Ok(SortOutcome { run, rounds: records })
}
