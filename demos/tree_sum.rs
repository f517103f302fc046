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

//! Tree (recursive halving) sum over an in-process group
//!
//! Run with: cargo run --example tree_sum -- 7
//!
//! Only ordinal 0 holds the result; every other peer reports inactive.

use std::env;
use std::time::Instant;

use cylon_exchange::error::ExchangeResult;
use cylon_exchange::net::run_on_local_group;
use cylon_exchange::ops::{reduce_sum, ReductionResult};
use cylon_exchange::topology::is_power_of_two;
use cylon_exchange::util::logging::init_logging;
use cylon_exchange::{ExchangeConfig, Topology};

fn main() -> ExchangeResult<()> {
    init_logging();

    let size: usize = env::args()
        .nth(1)
        .map(|s| s.parse().expect("Invalid group_size"))
        .unwrap_or(7);

    let expected = (size * (size + 1) / 2) as f64;
    println!("=== Tree global sum ===");
    println!(
        "Peers: {} ({} a power of two)",
        size,
        if is_power_of_two(size) { "is" } else { "is NOT" }
    );
    let values: Vec<String> = (1..=size).map(|v| v.to_string()).collect();
    println!("Local values: {}", values.join(" "));
    println!("Expected sum: {:.0}\n", expected);

    let config = ExchangeConfig::new()
        .with_reduce_topology(Topology::Tree)
        .with_log_rounds(true);

    let start = Instant::now();
    let results = run_on_local_group(size, config, |ctx| {
        reduce_sum(&ctx, (ctx.get_rank() + 1) as f64)
    })?;
    let elapsed = start.elapsed();

    println!("=== Results ===");
    for (ordinal, result) in results.iter().enumerate() {
        match result {
            ReductionResult::Root(v) | ReductionResult::Complete(v) => println!("P{:02}: {:.0}", ordinal, v),
            ReductionResult::Inactive => println!("P{:02}: inactive", ordinal),
        }
    }

    match results.first().and_then(|r| r.value()) {
        Some(sum) if (sum - expected).abs() < 1e-9 => println!("\nTree sum: {:.0} - CORRECT", sum),
        Some(sum) => println!("\nERROR: difference = {:.10}", sum - expected),
        None => println!("\nERROR: root holds no result"),
    }
    println!("Tree time: {:.6} seconds", elapsed.as_secs_f64());
    Ok(())
}
