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

//! Consensus constants. These are fixed by the wire format this workspace
//! is compatible with and must never be tuned per-deployment the way
//! `global::ChainType`-dependent policy knobs are.

/// Number of blocks between difficulty retargets.
pub const RETARGETING_INTERVAL: u64 = 2016;

/// Target duration, in seconds, of `RETARGETING_INTERVAL` blocks.
pub const TARGET_TIMESPAN: u64 = 14 * 24 * 60 * 60;

/// Target seconds between blocks.
pub const TARGET_SPACING: u64 = 600;

/// Maximum factor by which a retarget may speed up or slow down.
pub const RETARGETING_FACTOR: u64 = 4;

/// Width of the median-time-past window.
pub const MEDIAN_TIME_PAST_WINDOW: usize = 11;

/// Confirmations a coinbase output must accrue before it can be spent.
pub const COINBASE_MATURITY: u64 = 100;

/// Number of trailing blocks sampled for version enforcement thresholds.
pub const MAX_VERSION_SAMPLE: u64 = 1000;

/// Fraction of the sample (out of `MAX_VERSION_SAMPLE`) required to
/// *activate* enforcement of a new version rule (advisory phase).
pub const VERSION_ACTIVATION_THRESHOLD: u64 = 750;

/// Fraction of the sample required to make the rule mandatory.
pub const VERSION_ENFORCEMENT_THRESHOLD: u64 = 950;

/// Maximum serialized block size, in bytes.
pub const MAX_BLOCK_SIZE: usize = 1_000_000;

/// Maximum signature operations permitted in a single block.
pub const MAX_BLOCK_SIGOPS: u64 = 20_000;

/// How far into the future (seconds) a block timestamp may be, relative to
/// adjusted network time, before it is rejected.
pub const MAX_FUTURE_BLOCK_TIME: i64 = 2 * 60 * 60;

/// Height at which BIP16 (P2SH) enforcement begins.
pub const BIP16_ACTIVATION_HEIGHT: u64 = 173_805;

/// Block version from which BIP66 (strict DER) is enforced.
pub const BIP66_VERSION: i32 = 3;

/// Block version from which BIP65 (CHECKLOCKTIMEVERIFY) is enforced.
pub const BIP65_VERSION: i32 = 4;

/// Initial block subsidy, in satoshis.
pub const INITIAL_SUBSIDY: u64 = 50_0000_0000;

/// Number of blocks between subsidy halvings.
pub const SUBSIDY_HALVING_INTERVAL: u64 = 210_000;

/// Upper bound on any single amount or aggregate sum, in satoshis: more
/// than this could ever exist given the subsidy schedule.
pub const MAX_MONEY: u64 = 21_000_000 * 100_000_000;

/// Minimum fee rate, in satoshis per 1000 bytes of serialized size, for a
/// transaction to be relayed/pooled rather than dropped as dust.
pub const MIN_RELAY_FEE_RATE: u64 = 1000;

/// Maximum serialized size, in bytes, of a transaction the pool accepts.
/// Smaller than `MAX_BLOCK_SIZE` so a single transaction can never alone
/// make a block oversized.
pub const MAX_STANDARD_TX_SIZE: usize = 100_000;

/// Computes the block subsidy at `height`, halving every
/// `SUBSIDY_HALVING_INTERVAL` blocks down to zero.
pub fn subsidy(height: u64) -> u64 {
	let halvings = height / SUBSIDY_HALVING_INTERVAL;
	if halvings >= 64 {
		return 0;
	}
	INITIAL_SUBSIDY >> halvings
}
