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

//! Values shared across the workspace that are policy, not consensus:
//! which network we're on, and a couple of knobs (pool capacity) that are
//! reasonable to vary between deployments without touching the wire
//! format. Kept deliberately small — this is not a general config/CLI
//! layer, just the handful of globals the validator and organizer need.

use num_bigint::BigUint;

use crate::consensus;
use crate::target::{CompactTarget, MAX_TARGET};

/// Which network we're validating against. Only affects the knobs below,
/// never the consensus constants in `consensus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainType {
	/// Production network.
	Mainnet,
	/// Public test network: permits a special-cased minimum-difficulty
	/// block when the inter-block gap grows too large.
	Testnet,
	/// Local regression-testing network: fixed, trivial difficulty.
	Regtest,
}

impl ChainType {
	/// Whether this network allows the "emergency difficulty" rule: a
	/// block more than `2 * target_spacing` after its predecessor may be
	/// mined at the maximum (easiest) target.
	pub fn allows_min_difficulty_blocks(self) -> bool {
		matches!(self, ChainType::Testnet | ChainType::Regtest)
	}

	/// The network's proof-of-work ceiling (easiest permitted target).
	pub fn max_target(self) -> BigUint {
		match self {
			ChainType::Regtest => {
				// Regtest never retargets in practice; still bounded by the
				// same representable ceiling as mainnet/testnet.
				BigUint::from_bytes_be(&MAX_TARGET)
			}
			_ => BigUint::from_bytes_be(&MAX_TARGET),
		}
	}

	/// The network's genesis `bits`.
	pub fn genesis_bits(self) -> CompactTarget {
		match self {
			ChainType::Regtest => CompactTarget::from_biguint(&self.max_target()),
			_ => CompactTarget(0x1d00ffff),
		}
	}
}

impl Default for ChainType {
	fn default() -> Self {
		ChainType::Mainnet
	}
}

/// Policy knobs read by the organizer and transaction pool; distinct from
/// `ChainType` because these are pure capacity/throughput tuning, not
/// network identity.
#[derive(Debug, Clone)]
pub struct GlobalConfig {
	/// Which network we're on.
	pub chain_type: ChainType,
	/// Maximum number of unconfirmed transactions the pool will hold.
	pub max_pool_transactions: usize,
	/// Maximum number of candidate (not-yet-connected) blocks retained in
	/// the block pool before the oldest is evicted.
	pub max_pool_blocks: usize,
}

impl GlobalConfig {
	/// Mainnet defaults.
	pub fn mainnet() -> GlobalConfig {
		GlobalConfig {
			chain_type: ChainType::Mainnet,
			max_pool_transactions: 50_000,
			max_pool_blocks: 100,
		}
	}

	/// Testnet defaults: smaller pools, the same consensus rules.
	pub fn testnet() -> GlobalConfig {
		GlobalConfig {
			chain_type: ChainType::Testnet,
			max_pool_transactions: 5_000,
			max_pool_blocks: 100,
		}
	}

	/// Regtest defaults, convenient for deterministic tests.
	pub fn regtest() -> GlobalConfig {
		GlobalConfig {
			chain_type: ChainType::Regtest,
			max_pool_transactions: 1_000,
			max_pool_blocks: 50,
		}
	}
}

impl Default for GlobalConfig {
	fn default() -> Self {
		GlobalConfig::mainnet()
	}
}

/// Returns the expected block subsidy at `height`; a thin re-export so
/// callers needn't reach into `consensus` directly for the one dynamic
/// consensus quantity (subsidy is a function of height, not a constant).
pub fn subsidy(height: u64) -> u64 {
	consensus::subsidy(height)
}
