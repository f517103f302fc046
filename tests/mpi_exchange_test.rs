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

//! Tests for the MPI communicator
//!
//! Run with: mpirun -n 5 cargo test --features mpi --test mpi_exchange_test

#[cfg(feature = "mpi")]
mod mpi_tests {
    use cylon_exchange::error::ExchangeResult;
    use cylon_exchange::net::mpi::MPICommunicator;
    use cylon_exchange::ops::{all_reduce_sum, distributed_sort, tree_reduce_sum, ReductionResult};
    use cylon_exchange::{ExchangeConfig, ExchangeContext};

    // MPI can only be initialized once per process, so everything runs in one test
    #[test]
    fn test_mpi_collectives() -> ExchangeResult<()> {
        let ctx = ExchangeContext::init(MPICommunicator::make()?, ExchangeConfig::default())?;
        let rank = ctx.get_rank();
        let size = ctx.get_world_size();

        let sum = all_reduce_sum(&ctx, (rank + 1) as f64)?;
        assert!((sum - (size * (size + 1) / 2) as f64).abs() < 1e-9);

        let tree = tree_reduce_sum(&ctx, 1i64)?;
        if rank == 0 {
            assert_eq!(tree, ReductionResult::Root(size as i64));
        } else {
            assert_eq!(tree, ReductionResult::Inactive);
        }

        let items: Vec<i32> = (0..4).map(|i| ((rank * 37 + i * 11) % 100) as i32).collect();
        let outcome = distributed_sort(&ctx, items)?;
        if rank == 0 {
            let merged = outcome.into_items().unwrap_or_default();
            assert_eq!(merged.len(), size * 4);
            assert!(merged.windows(2).all(|w| w[0] <= w[1]));
        } else {
            assert!(!outcome.is_root());
        }

        ctx.barrier()?;
        Ok(())
    }
}
