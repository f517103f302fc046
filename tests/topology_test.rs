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

//! Tests for partner selection

use std::collections::BTreeSet;

use cylon_exchange::topology::{
    binomial_role, butterfly_fold, butterfly_partner, butterfly_role, butterfly_rounds, is_power_of_two,
    largest_power_of_two_at_most, tree_active_size, tree_role, tree_rounds, FoldRole,
};
use cylon_exchange::{PeerRole, Topology};

const SIZES: [usize; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 16, 17];

#[test]
fn test_power_of_two_helpers() {
    assert!(!is_power_of_two(0));
    assert!(is_power_of_two(1));
    assert!(is_power_of_two(8));
    assert!(!is_power_of_two(12));

    assert_eq!(largest_power_of_two_at_most(1), 1);
    assert_eq!(largest_power_of_two_at_most(5), 4);
    assert_eq!(largest_power_of_two_at_most(16), 16);
    assert_eq!(largest_power_of_two_at_most(17), 16);

    assert_eq!(butterfly_rounds(1), 0);
    assert_eq!(butterfly_rounds(2), 1);
    assert_eq!(butterfly_rounds(5), 3);
    assert_eq!(butterfly_rounds(8), 3);
    assert_eq!(butterfly_rounds(17), 5);
    assert_eq!(tree_rounds(7), 3);
}

#[test]
fn test_butterfly_partner_is_self_inverse() {
    for &size in SIZES.iter() {
        for step in 0..butterfly_rounds(size) {
            for ordinal in 0..size {
                if let Some(partner) = butterfly_partner(ordinal, size, step) {
                    assert_ne!(partner, ordinal);
                    assert_eq!(
                        butterfly_partner(partner, size, step),
                        Some(ordinal),
                        "size {} step {} ordinal {}",
                        size,
                        step,
                        ordinal
                    );
                }
            }
        }
    }
}

#[test]
fn test_butterfly_role_outside_group_is_idle() {
    // size 5, step 0: P4 ^ 1 = 5 is outside
    assert_eq!(butterfly_role(4, 5, 0), PeerRole::IdleNoPartner);
    assert_eq!(butterfly_role(4, 5, 2), PeerRole::Exchanging { partner: 0 });
    assert_eq!(butterfly_role(1, 5, 1), PeerRole::Exchanging { partner: 3 });
    assert_eq!(Topology::Butterfly.role(2, 5, 2), PeerRole::IdleNoPartner);
}

/// Simulates which contributions each peer knows after the plain XOR
/// schedule with idle rounds
fn plain_xor_knowledge(size: usize) -> Vec<BTreeSet<usize>> {
    let mut known: Vec<BTreeSet<usize>> = (0..size).map(|o| BTreeSet::from([o])).collect();
    for step in 0..butterfly_rounds(size) {
        let before = known.clone();
        for ordinal in 0..size {
            if let Some(partner) = butterfly_partner(ordinal, size, step) {
                known[ordinal].extend(before[partner].iter().copied());
            }
        }
    }
    known
}

#[test]
fn test_plain_xor_schedule_covers_power_of_two_groups_only() {
    for size in [1, 2, 4, 8, 16] {
        assert!(plain_xor_knowledge(size).iter().all(|k| k.len() == size));
    }

    let known = plain_xor_knowledge(5);
    assert_eq!(known[0].len(), 5);
    for ordinal in 1..4 {
        assert!(!known[ordinal].contains(&4), "P{} should miss P4", ordinal);
    }
}

#[test]
fn test_butterfly_fold_pairs_excess_with_core() {
    assert_eq!(butterfly_fold(0, 8), FoldRole::Core);
    assert_eq!(butterfly_fold(0, 5), FoldRole::CoreWithExtra { extra: 4 });
    assert_eq!(butterfly_fold(1, 5), FoldRole::Core);
    assert_eq!(butterfly_fold(4, 5), FoldRole::Extra { core: 0 });
    assert_eq!(butterfly_fold(2, 7), FoldRole::CoreWithExtra { extra: 6 });
    assert_eq!(butterfly_fold(6, 7), FoldRole::Extra { core: 2 });

    for size in 1..=33 {
        for ordinal in 0..size {
            match butterfly_fold(ordinal, size) {
                FoldRole::CoreWithExtra { extra } => {
                    assert_eq!(butterfly_fold(extra, size), FoldRole::Extra { core: ordinal })
                }
                FoldRole::Extra { core } => {
                    assert_eq!(butterfly_fold(core, size), FoldRole::CoreWithExtra { extra: ordinal })
                }
                FoldRole::Core => {}
            }
        }
    }
}

#[test]
fn test_tree_roles_for_odd_range() {
    // [0, 5): keep 3, P3 -> P0, P4 -> P1, P2 idle
    assert_eq!(tree_role(0, 5), PeerRole::ActiveReceiver { partner: 3 });
    assert_eq!(tree_role(1, 5), PeerRole::ActiveReceiver { partner: 4 });
    assert_eq!(tree_role(2, 5), PeerRole::IdleNoPartner);
    assert_eq!(tree_role(3, 5), PeerRole::SenderTerminal { partner: 0 });
    assert_eq!(tree_role(4, 5), PeerRole::SenderTerminal { partner: 1 });
    assert_eq!(tree_role(5, 5), PeerRole::Terminated);
    assert_eq!(tree_role(0, 1), PeerRole::IdleNoPartner);

    assert_eq!(tree_active_size(5, 0), 5);
    assert_eq!(tree_active_size(5, 1), 3);
    assert_eq!(tree_active_size(5, 2), 2);
    assert_eq!(tree_active_size(5, 3), 1);
}

#[test]
fn test_binomial_roles() {
    assert_eq!(binomial_role(0, 5, 0), PeerRole::ActiveReceiver { partner: 1 });
    assert_eq!(binomial_role(1, 5, 0), PeerRole::SenderTerminal { partner: 0 });
    assert_eq!(binomial_role(4, 5, 0), PeerRole::IdleNoPartner);
    assert_eq!(binomial_role(1, 5, 1), PeerRole::Terminated);
    assert_eq!(binomial_role(2, 5, 1), PeerRole::SenderTerminal { partner: 0 });
    assert_eq!(binomial_role(4, 5, 1), PeerRole::IdleNoPartner);
    assert_eq!(binomial_role(0, 5, 2), PeerRole::ActiveReceiver { partner: 4 });
    assert_eq!(binomial_role(4, 5, 2), PeerRole::SenderTerminal { partner: 0 });
}

/// Moves contribution sets along a rooted schedule and checks that each
/// round pairs senders and receivers consistently and nothing is lost
fn check_rooted(size: usize, rounds: u32, role: impl Fn(usize, u32) -> PeerRole) {
    let mut held: Vec<Option<BTreeSet<usize>>> = (0..size).map(|o| Some(BTreeSet::from([o]))).collect();
    for step in 0..rounds {
        let before = held.clone();
        for ordinal in 0..size {
            if before[ordinal].is_none() {
                continue;
            }
            match role(ordinal, step) {
                PeerRole::ActiveReceiver { partner } => {
                    assert_eq!(role(partner, step), PeerRole::SenderTerminal { partner: ordinal });
                    let incoming = before[partner].clone().expect("sender must still be active");
                    held[ordinal].as_mut().expect("receiver is active").extend(incoming);
                }
                PeerRole::SenderTerminal { partner } => {
                    assert_eq!(role(partner, step), PeerRole::ActiveReceiver { partner: ordinal });
                    held[ordinal] = None;
                }
                PeerRole::IdleNoPartner => {}
                other => panic!("active P{} got {:?} at step {} of size {}", ordinal, other, step, size),
            }
        }
        let total: usize = held.iter().flatten().map(BTreeSet::len).sum();
        assert_eq!(total, size, "size {} step {}", size, step);
    }
    assert_eq!(held[0].as_ref().map(BTreeSet::len), Some(size));
    assert!(held[1..].iter().all(Option::is_none));
}

#[test]
fn test_tree_schedule_reaches_root_for_any_size() {
    for size in 1..=33 {
        check_rooted(size, Topology::Tree.rounds(size), |o, s| Topology::Tree.role(o, size, s));
    }
}

#[test]
fn test_binomial_schedule_reaches_root_for_any_size() {
    for size in 1..=33 {
        check_rooted(size, butterfly_rounds(size), |o, s| binomial_role(o, size, s));
    }
}

#[test]
fn test_topology_serde_names() {
    assert_eq!(serde_json::to_string(&Topology::Tree).unwrap(), "\"tree\"");
    let t: Topology = serde_json::from_str("\"butterfly\"").unwrap();
    assert_eq!(t, Topology::Butterfly);
    assert!(Topology::Butterfly.is_symmetric());
    assert!(!Topology::Tree.is_symmetric());
}
