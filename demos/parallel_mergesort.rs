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

//! Parallel merge sort over an in-process group
//!
//! Run with: cargo run --example parallel_mergesort -- 8 4
//!
//! Arguments:
//!   group_size - Number of peers (default 8)
//!   per_peer - Items generated by each peer (default 4)

use std::env;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cylon_exchange::error::ExchangeResult;
use cylon_exchange::net::run_on_local_group;
use cylon_exchange::ops::distributed_sort;
use cylon_exchange::util::logging::init_logging;
use cylon_exchange::ExchangeConfig;

fn local_items(ordinal: usize, count: usize) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(ordinal as u64 + 1);
    (0..count).map(|_| rng.gen_range(0..1000)).collect()
}

fn main() -> ExchangeResult<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let size: usize = args.get(1).map(|s| s.parse().expect("Invalid group_size")).unwrap_or(8);
    let per_peer: usize = args.get(2).map(|s| s.parse().expect("Invalid per_peer")).unwrap_or(4);

    println!("=== Parallel merge sort ===");
    println!(
        "Total items: {}, Peers: {}, Items/peer: {}\n",
        size * per_peer,
        size,
        per_peer
    );

    let outcomes = run_on_local_group(size, ExchangeConfig::default(), |ctx| {
        distributed_sort(&ctx, local_items(ctx.get_rank(), per_peer))
    })?;

    println!("Sorted local runs:");
    for ordinal in 0..size {
        let mut items = local_items(ordinal, per_peer);
        items.sort();
        println!("Peer {}: {:?}", ordinal, items);
    }

    println!("\n=== Step by step ===");
    let rounds = outcomes.first().map_or(0, |o| o.rounds.len());
    for round in 0..rounds {
        for (ordinal, outcome) in outcomes.iter().enumerate() {
            let record = &outcome.rounds[round];
            println!("P{:02}: round {} {:?} -> holds {}", ordinal, record.round, record.role, record.run_len);
        }
        println!();
    }

    let merged = outcomes
        .into_iter()
        .next()
        .and_then(|outcome| outcome.into_items())
        .unwrap_or_default();
    println!("Final sorted list ({} items):", merged.len());
    for chunk in merged.chunks(20) {
        println!(" {:?}", chunk);
    }

    let sorted = merged.windows(2).all(|w| w[0] <= w[1]) && merged.len() == size * per_peer;
    println!("\nList {}sorted correctly", if sorted { "" } else { "NOT " });
    Ok(())
}
