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


//! Collective operations built from pairwise exchanges

pub mod all_reduce;
pub mod distributed_sort;
pub mod merge;
pub mod participant;

pub use all_reduce::{
    all_reduce_sum, binomial_reduce_sum, reduce_sum, tree_reduce_sum, ReductionResult, Summable,
};
pub use distributed_sort::{distributed_sort, distributed_sort_with, RoundRecord, SortOutcome, SortedRun};
pub use merge::{merge_combine, merge_combine_by};
pub use participant::Participant;
