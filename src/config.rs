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

//! Configuration for exchange collectives

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, ExchangeResult};
use crate::topology::Topology;

/// Configuration carried by an [`ExchangeContext`](crate::ctx::ExchangeContext)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Topology used by `reduce_sum`
    pub reduce_topology: Topology,
    /// Message tag stamped on every point-to-point message
    pub tag: i32,
    /// Log every round at debug level
    pub log_rounds: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            reduce_topology: Topology::Butterfly,
            tag: 0,
            log_rounds: false,
        }
    }
}

impl ExchangeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the topology used by `reduce_sum`
    pub fn with_reduce_topology(mut self, topology: Topology) -> Self {
        self.reduce_topology = topology;
        self
    }

    /// Set the message tag
    pub fn with_tag(mut self, tag: i32) -> Self {
        self.tag = tag;
        self
    }

    /// Enable per-round logging
    pub fn with_log_rounds(mut self, enabled: bool) -> Self {
        self.log_rounds = enabled;
        self
    }

    pub fn validate(&self) -> ExchangeResult<()> {
        // MPI reserves negative tags for wildcards
        if self.tag < 0 {
            return Err(ExchangeError::Invalid(format!(
                "message tag must be non-negative, got {}",
                self.tag
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> ExchangeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> ExchangeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> ExchangeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
