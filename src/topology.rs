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

//! Partner selection over a virtual hypercube
//!
//! All functions here are pure: they map `(ordinal, size, step)` to a partner
//! ordinal or a [`PeerRole`]. Two topologies are supported:
//!
//! - **Butterfly** (XOR mask): at step `d` the partner is `ordinal ^ (1 << d)`.
//!   A partner `>= size` means the peer sits the round out.
//! - **Tree** (halving): the active range `[0, c)` is split in two each round,
//!   the upper part sends to the lower part and terminates.
//!
//! For odd `c` the tree keeps `ceil(c / 2)` peers: ordinals in `[keep, c)`
//! send to `ordinal - keep` and ordinal `keep - 1` idles for the round. With
//! an even `c` this is the classic `half = c / 2` split.

use serde::{Deserialize, Serialize};

use crate::peer::PeerRole;

/// Partner-selection algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// XOR-mask hypercube; every peer learns the result
    #[default]
    Butterfly,
    /// Recursive halving; only ordinal 0 survives
    Tree,
}

impl Topology {
    /// Number of rounds needed for a group of `size` peers
    pub fn rounds(self, size: usize) -> u32 {
        match self {
            Topology::Butterfly => butterfly_rounds(size),
            Topology::Tree => tree_rounds(size),
        }
    }

    /// Role of `ordinal` at `step`
    pub fn role(self, ordinal: usize, size: usize, step: u32) -> PeerRole {
        match self {
            Topology::Butterfly => butterfly_role(ordinal, size, step),
            Topology::Tree => tree_role(ordinal, tree_active_size(size, step)),
        }
    }

    /// Whether every peer ends with the result, or only the root
    pub fn is_symmetric(self) -> bool {
        matches!(self, Topology::Butterfly)
    }
}

pub fn is_power_of_two(x: usize) -> bool {
    x > 0 && (x & (x - 1)) == 0
}

/// Largest power of two that is `<= x`. `x` must be at least 1.
pub fn largest_power_of_two_at_most(x: usize) -> usize {
    debug_assert!(x >= 1);
    1 << (usize::BITS - 1 - x.leading_zeros())
}

/// `ceil(log2(size))`, the hypercube dimension
pub fn butterfly_rounds(size: usize) -> u32 {
    if size <= 1 {
        0
    } else {
        usize::BITS - (size - 1).leading_zeros()
    }
}

/// XOR-mask partner at `step`, or `None` when it falls outside the group
pub fn butterfly_partner(ordinal: usize, size: usize, step: u32) -> Option<usize> {
    if step >= usize::BITS {
        return None;
    }
    let partner = ordinal ^ (1usize << step);
    (partner < size).then_some(partner)
}

pub fn butterfly_role(ordinal: usize, size: usize, step: u32) -> PeerRole {
    match butterfly_partner(ordinal, size, step) {
        Some(partner) => PeerRole::Exchanging { partner },
        None => PeerRole::IdleNoPartner,
    }
}

/// XOR partner with send-and-terminate semantics (binary-tree combine).
///
/// The lower ordinal of a pair receives, the higher one sends and terminates.
/// A peer with any bit set below `step` already sent in an earlier round.
pub fn binomial_role(ordinal: usize, size: usize, step: u32) -> PeerRole {
    if step >= usize::BITS {
        return if ordinal == 0 {
            PeerRole::IdleNoPartner
        } else {
            PeerRole::Terminated
        };
    }
    let mask = 1usize << step;
    if ordinal & (mask - 1) != 0 {
        return PeerRole::Terminated;
    }
    match butterfly_partner(ordinal, size, step) {
        Some(partner) if ordinal < partner => PeerRole::ActiveReceiver { partner },
        Some(partner) => PeerRole::SenderTerminal { partner },
        None => PeerRole::IdleNoPartner,
    }
}

/// Rounds of halving until one peer remains
pub fn tree_rounds(size: usize) -> u32 {
    butterfly_rounds(size)
}

/// Size of the active range after `step` rounds of halving: `ceil(size / 2^step)`
pub fn tree_active_size(size: usize, step: u32) -> usize {
    let mut current = size;
    for _ in 0..step {
        if current <= 1 {
            break;
        }
        current -= current / 2;
    }
    current
}

/// Role of `ordinal` in a halving round over the active range `[0, current_size)`
pub fn tree_role(ordinal: usize, current_size: usize) -> PeerRole {
    if ordinal >= current_size {
        return PeerRole::Terminated;
    }
    if current_size <= 1 {
        return PeerRole::IdleNoPartner;
    }
    let keep = current_size - current_size / 2;
    if ordinal >= keep {
        PeerRole::SenderTerminal {
            partner: ordinal - keep,
        }
    } else if ordinal + keep < current_size {
        PeerRole::ActiveReceiver {
            partner: ordinal + keep,
        }
    } else {
        // odd range: the middle ordinal has no upper counterpart
        PeerRole::IdleNoPartner
    }
}

/// Placement of a peer when a non-power-of-two group is folded onto its
/// largest power-of-two core before butterfly rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldRole {
    /// In the core, with no extra peer attached
    Core,
    /// In the core and absorbs `extra` before the rounds, answers it after
    CoreWithExtra { extra: usize },
    /// Outside the core; hands its value to `core` and waits for the result
    Extra { core: usize },
}

pub fn butterfly_fold(ordinal: usize, size: usize) -> FoldRole {
    let core = largest_power_of_two_at_most(size.max(1));
    let excess = size.saturating_sub(core);
    if ordinal >= core {
        FoldRole::Extra {
            core: ordinal - core,
        }
    } else if ordinal < excess {
        FoldRole::CoreWithExtra {
            extra: ordinal + core,
        }
    } else {
        FoldRole::Core
    }
}
