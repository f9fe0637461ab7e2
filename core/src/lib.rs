// Copyright 2026 The Node Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared primitives for the bcnode workspace: block/transaction types,
//! hashing, compact-target/difficulty math, consensus constants, and the
//! small set of cross-cutting types (clock, chain lock, stop flag,
//! subscriber registry) that both the chain and transaction-pool crates
//! build on.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]

pub mod block;
pub mod chain_lock;
pub mod clock;
pub mod consensus;
pub mod global;
pub mod hash;
pub mod merkle;
pub mod outpoint;
pub mod registry;
pub mod stop;
pub mod target;
pub mod transaction;
pub mod verify;

pub use crate::block::{Block, BlockHeader};
pub use crate::chain_lock::ChainLock;
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::global::{ChainType, GlobalConfig};
pub use crate::hash::{Hash, Hashed};
pub use crate::outpoint::OutPoint;
pub use crate::registry::{Registry, Relayed, Resubscribe, SubscriptionId};
pub use crate::stop::StopFlag;
pub use crate::target::{CompactTarget, Difficulty};
pub use crate::transaction::{Transaction, TxIn, TxOut};
pub use crate::verify::{legacy_sigop_count, HashPowVerifier, PowVerifier, ScriptFlags, ScriptVerifier};
