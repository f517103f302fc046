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


//! Cylon exchange: collectives over pairwise point-to-point exchanges
//!
//! N peers compute a global sum, or merge their sorted runs into one, using
//! only pairwise messages over a virtual hypercube. Every schedule works for
//! any group size, not just powers of two.

pub mod config;
pub mod ctx;
pub mod error;
pub mod net;
pub mod ops;
pub mod peer;
pub mod topology;
pub mod util;

// Re-export commonly used types
pub use crate::config::ExchangeConfig;
pub use crate::ctx::ExchangeContext;
pub use crate::error::{Code, ExchangeError, ExchangeResult};
pub use crate::peer::{Group, PeerHandle, PeerRole, PeerState};
pub use crate::topology::Topology;

/// The main entry point and version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
