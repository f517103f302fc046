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

//! Butterfly all-reduce over an in-process group
//!
//! Run with: cargo run --example butterfly_sum -- 6
//!
//! Arguments:
//!   group_size - Number of peers (default 8); need not be a power of two

use std::env;
use std::time::Instant;

use cylon_exchange::error::ExchangeResult;
use cylon_exchange::net::run_on_local_group;
use cylon_exchange::ops::all_reduce_sum;
use cylon_exchange::topology::{butterfly_partner, butterfly_rounds, is_power_of_two};
use cylon_exchange::util::logging::init_logging;
use cylon_exchange::ExchangeConfig;

fn main() -> ExchangeResult<()> {
    init_logging();

    let size: usize = env::args()
        .nth(1)
        .map(|s| s.parse().expect("Invalid group_size"))
        .unwrap_or(8);

    let expected = (size * (size + 1) / 2 * 10) as f64;
    println!("=== Butterfly global sum ({} peers) ===", size);
    println!(
        "Configuration: {} a power of two",
        if is_power_of_two(size) { "is" } else { "is NOT" }
    );
    println!("Local values:");
    for ordinal in 0..size {
        print!("P{}: {:.0}  ", ordinal, ((ordinal + 1) * 10) as f64);
        if (ordinal + 1) % 5 == 0 {
            println!();
        }
    }
    println!("\nExpected sum: {:.0}", expected);

    println!("\n=== Step by step (plain XOR pairing) ===");
    for step in 0..butterfly_rounds(size) {
        for ordinal in 0..size {
            match butterfly_partner(ordinal, size, step) {
                Some(partner) => println!("P{:02}: step {} - exchange with P{:02}", ordinal, step, partner),
                None => println!("P{:02}: step {} - no partner", ordinal, step),
            }
        }
        println!();
    }

    let start = Instant::now();
    let results = run_on_local_group(size, ExchangeConfig::default(), |ctx| {
        let value = ((ctx.get_rank() + 1) * 10) as f64;
        all_reduce_sum(&ctx, value)
    })?;
    let elapsed = start.elapsed();

    println!("=== Verification ===");
    let mut all_correct = true;
    for (ordinal, sum) in results.iter().enumerate() {
        let ok = (sum - expected).abs() < 1e-9;
        all_correct &= ok;
        println!(
            "P{:02}: {:.0} - {}",
            ordinal,
            sum,
            if ok { "CORRECT" } else { "INCORRECT" }
        );
    }
    println!("\nRounds: ceil(log2({})) = {}", size, butterfly_rounds(size));
    println!("Time: {:.6} seconds", elapsed.as_secs_f64());
    println!(
        "{}",
        if all_correct {
            "Every peer holds the global sum"
        } else {
            "Some peers do NOT hold the global sum"
        }
    );
    Ok(())
}
