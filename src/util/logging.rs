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


//! Logging utilities
//!
//! Collectives log through the `log` facade; binaries and tests pick the
//! backend. These helpers install `env_logger`.

use log::LevelFilter;

/// Initialize logging from `RUST_LOG`
pub fn init_logging() {
    env_logger::init();
}

/// Initialize logging with a specific level, ignoring `RUST_LOG`
pub fn init_logging_with_level(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Initialize logging for tests; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init();
}

#[macro_export]
macro_rules! exchange_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! exchange_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! exchange_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! exchange_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! exchange_trace {
    ($($arg:tt)*) => {
        log::trace!($($arg)*)
    };
}
