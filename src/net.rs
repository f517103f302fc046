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

//! Networking and communication components
//!
//! The collectives only need a reliable, in-order, blocking point-to-point
//! channel between any two peers. [`Communicator`] is that seam; `local`
//! implements it in-process and `mpi` implements it over MPI.

pub mod communicator;
pub mod local;
pub mod message;

#[cfg(feature = "mpi")]
pub mod mpi;

pub use communicator::Communicator;
pub use local::{run_on_local_group, LocalCommunicator};
pub use message::{Envelope, OpKind};

/// Communication backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommType {
    Local,
    #[cfg(feature = "mpi")]
    Mpi,
}
