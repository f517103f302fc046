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

//! Tests for configuration, peer identity and the exchange context

use std::io::Write;
use std::sync::Arc;

use cylon_exchange::error::{Code, ExchangeError, ExchangeResult};
use cylon_exchange::net::{CommType, Communicator};
use cylon_exchange::{ExchangeConfig, ExchangeContext, Group, PeerHandle, Topology};

/// A communicator that reports whatever identity it is given
struct FixedComm {
    rank: usize,
    world_size: usize,
}

impl Communicator for FixedComm {
    fn get_rank(&self) -> usize {
        self.rank
    }

    fn get_world_size(&self) -> usize {
        self.world_size
    }

    fn get_comm_type(&self) -> CommType {
        CommType::Local
    }

    fn barrier(&self) -> ExchangeResult<()> {
        Ok(())
    }

    fn send(&self, _data: &[u8], _dest: usize, _tag: i32) -> ExchangeResult<()> {
        Err(ExchangeError::ChannelFailure("no communication expected".to_string()))
    }

    fn recv(&self, _buffer: &mut Vec<u8>, _source: usize, _tag: i32) -> ExchangeResult<()> {
        Err(ExchangeError::ChannelFailure("no communication expected".to_string()))
    }
}

#[test]
fn test_empty_group_is_rejected() {
    let err = Group::new(0).unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidGroupSize(0)));
    assert_eq!(err.code(), Code::Invalid);
}

#[test]
fn test_peer_handle() -> ExchangeResult<()> {
    let group = Group::new(6)?;
    assert!(!group.is_power_of_two());
    assert!(Group::new(8)?.is_power_of_two());

    let handle = PeerHandle::new(3, group)?;
    assert_eq!(handle.ordinal(), 3);
    assert_eq!(handle.size(), 6);
    assert!(!handle.is_root());
    assert_eq!(handle.to_string(), "P03/6");

    let err = PeerHandle::new(6, group).unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidOrdinal { ordinal: 6, size: 6 }));
    Ok(())
}

#[test]
fn test_context_rejects_bad_identity_before_communicating() {
    let err = ExchangeContext::new(Arc::new(FixedComm { rank: 0, world_size: 0 }), ExchangeConfig::default())
        .err()
        .expect("empty world must be rejected");
    assert!(matches!(err, ExchangeError::InvalidGroupSize(0)));

    let err = ExchangeContext::new(Arc::new(FixedComm { rank: 4, world_size: 4 }), ExchangeConfig::default())
        .err()
        .expect("rank outside the world must be rejected");
    assert!(matches!(err, ExchangeError::InvalidOrdinal { .. }));
}

#[test]
fn test_context_sequence_numbers() -> ExchangeResult<()> {
    let ctx = ExchangeContext::new(Arc::new(FixedComm { rank: 2, world_size: 5 }), ExchangeConfig::default())?;
    assert_eq!(ctx.get_rank(), 2);
    assert_eq!(ctx.get_world_size(), 5);
    assert_eq!(ctx.handle().to_string(), "P02/5");
    assert_eq!(ctx.get_next_sequence(), 0);
    assert_eq!(ctx.get_next_sequence(), 1);
    ctx.barrier()?;

    let local = ExchangeContext::init_local()?;
    assert_eq!(local.get_world_size(), 1);
    assert_eq!(local.get_communicator().get_comm_type(), CommType::Local);
    Ok(())
}

#[test]
fn test_config_defaults_and_builders() {
    let config = ExchangeConfig::default();
    assert_eq!(config.reduce_topology, Topology::Butterfly);
    assert_eq!(config.tag, 0);
    assert!(!config.log_rounds);

    let config = ExchangeConfig::new()
        .with_reduce_topology(Topology::Tree)
        .with_tag(7)
        .with_log_rounds(true);
    assert_eq!(config.reduce_topology, Topology::Tree);
    assert_eq!(config.tag, 7);
    assert!(config.log_rounds);
}

#[test]
fn test_config_from_json() -> ExchangeResult<()> {
    let config = ExchangeConfig::from_json_str(r#"{"reduce_topology": "tree"}"#)?;
    assert_eq!(config.reduce_topology, Topology::Tree);
    assert_eq!(config.tag, 0);

    let round_trip = ExchangeConfig::from_json_str(&config.to_json()?)?;
    assert_eq!(round_trip, config);

    let err = ExchangeConfig::from_json_str(r#"{"reduce_topology": "ring"}"#).unwrap_err();
    assert_eq!(err.code(), Code::SerializationError);
    Ok(())
}

#[test]
fn test_config_from_file() -> ExchangeResult<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, r#"{{"tag": 12, "log_rounds": true}}"#)?;
    let config = ExchangeConfig::from_json_file(file.path())?;
    assert_eq!(config.tag, 12);
    assert!(config.log_rounds);
    assert_eq!(config.reduce_topology, Topology::Butterfly);

    let missing = ExchangeConfig::from_json_file(file.path().with_extension("missing")).unwrap_err();
    assert_eq!(missing.code(), Code::IoError);
    Ok(())
}

#[test]
fn test_negative_tag_is_rejected() {
    let err = ExchangeConfig::from_json_str(r#"{"tag": -1}"#).unwrap_err();
    assert!(matches!(err, ExchangeError::Invalid(_)));

    let err = ExchangeContext::new(
        Arc::new(FixedComm { rank: 0, world_size: 1 }),
        ExchangeConfig::new().with_tag(-3),
    )
    .err()
    .expect("negative tag must be rejected");
    assert!(matches!(err, ExchangeError::Invalid(_)));
}

#[test]
fn test_error_codes() {
    let err = ExchangeError::new(Code::NotImplemented, "later");
    assert_eq!(err.code(), Code::NotImplemented);
    assert!(!err.is_ok());
    assert_eq!(ExchangeError::ProtocolDesync("x".into()).code(), Code::ProtocolError);
    assert_eq!(ExchangeError::ChannelFailure("x".into()).code(), Code::ChannelError);
    assert_eq!(ExchangeError::PreconditionViolation("x".into()).code(), Code::PreconditionError);
    assert_eq!(Code::ProtocolError.to_string(), "Protocol error");
}
