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

//! Butterfly all-reduce over MPI
//!
//! Run with: mpirun -n 5 cargo run --example mpi_butterfly_sum --features mpi

use cylon_exchange::error::ExchangeResult;
use cylon_exchange::net::mpi::MPICommunicator;
use cylon_exchange::ops::{all_reduce_sum, tree_reduce_sum};
use cylon_exchange::util::logging::init_logging;
use cylon_exchange::{ExchangeConfig, ExchangeContext};

fn main() -> ExchangeResult<()> {
    init_logging();

    let ctx = ExchangeContext::init(MPICommunicator::make()?, ExchangeConfig::default())?;
    let rank = ctx.get_rank();
    let size = ctx.get_world_size();
    let expected = (size * (size + 1) / 2 * 10) as f64;

    if rank == 0 {
        println!("=== Butterfly global sum over MPI ({} processes) ===", size);
        println!("Expected sum: {:.0}", expected);
    }
    ctx.barrier()?;

    let value = ((rank + 1) * 10) as f64;
    let sum = all_reduce_sum(&ctx, value)?;
    println!(
        "P{:02}: butterfly {:.0} - {}",
        rank,
        sum,
        if (sum - expected).abs() < 1e-9 { "CORRECT" } else { "INCORRECT" }
    );

    let tree = tree_reduce_sum(&ctx, value)?;
    if let Some(sum) = tree.value() {
        println!("P{:02}: tree {:.0}", rank, sum);
    }

    ctx.barrier()?;
    Ok(())
}
