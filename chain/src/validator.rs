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

//! The block validator (C3): context-free `check`, contextual `accept`,
//! and full `connect`. `accept`/`connect` read headers, transactions and
//! outputs through a small internal adapter (`header_at`/`resolve_output`)
//! that answers "at height h, what's visible?" from the in-flight fork
//! for heights above the fork's parent and from the store otherwise (§9
//! "Validator indirection") — a couple of free functions, not a trait
//! hierarchy.

use std::collections::HashSet;

use bcnode_core::consensus::{
	self, BIP16_ACTIVATION_HEIGHT, BIP65_VERSION, BIP66_VERSION, COINBASE_MATURITY,
	MAX_BLOCK_SIGOPS, MAX_BLOCK_SIZE, MAX_FUTURE_BLOCK_TIME, MAX_VERSION_SAMPLE, MEDIAN_TIME_PAST_WINDOW,
	RETARGETING_INTERVAL, VERSION_ENFORCEMENT_THRESHOLD,
};
use bcnode_core::target::{retarget, CompactTarget};
use bcnode_core::{
	legacy_sigop_count, Block, BlockHeader, Clock, GlobalConfig, Hashed, OutPoint, PowVerifier, ScriptFlags,
	ScriptVerifier, StopFlag, TxOut,
};
use bcnode_store::ChainStore;

use crate::error::{Error, ErrorKind};
use crate::pool::Fork;

/// Bundles the pure-function collaborators the validator needs (§1, §6):
/// proof-of-work and script verification, network parameters, and the
/// clock. Constructed once and shared across organize calls.
pub struct Validator<'a> {
	pub pow: &'a dyn PowVerifier,
	pub script: &'a dyn ScriptVerifier,
	pub clock: &'a dyn Clock,
	pub config: GlobalConfig,
}

impl<'a> Validator<'a> {
	/// Context-free structural checks. A pure function of the block's own
	/// bytes; never touches the store.
	pub fn check(&self, block: &Block) -> Result<(), Error> {
		if block.serialized_size() > MAX_BLOCK_SIZE {
			return Err(ErrorKind::OversizedBlock.into());
		}
		if block.computed_merkle_root() != block.header.merkle_root {
			return Err(ErrorKind::MerkleMismatch.into());
		}
		if !self.pow.verify(&block.header) {
			return Err(ErrorKind::InvalidPow.into());
		}
		if block.transactions.is_empty() || !block.transactions[0].is_coinbase() {
			return Err(ErrorKind::InvalidCoinbasePosition.into());
		}
		if block.transactions[1..].iter().any(|tx| tx.is_coinbase()) {
			return Err(ErrorKind::InvalidCoinbasePosition.into());
		}
		let mut seen = HashSet::new();
		for tx in &block.transactions {
			if !seen.insert(tx.hash()) {
				return Err(ErrorKind::DuplicateTransaction.into());
			}
		}
		let sigops: u64 = block
			.transactions
			.iter()
			.flat_map(|tx| {
				let input_ops = tx.inputs.iter().map(|i| legacy_sigop_count(&i.script_sig));
				let output_ops = tx.outputs.iter().map(|o| legacy_sigop_count(&o.script_pubkey));
				input_ops.chain(output_ops)
			})
			.sum();
		if sigops > MAX_BLOCK_SIGOPS {
			return Err(ErrorKind::TooManySigops.into());
		}
		Ok(())
	}

	/// Contextual, header-level validation of `fork.entries[index]`.
	pub fn accept(&self, fork: &Fork, index: usize, store: &dyn ChainStore) -> Result<(), Error> {
		let header = fork.entries[index].block.header;
		let height = fork.height_at(index);

		let expected_bits = self.expected_bits(fork, index, store, &header)?;
		if header.bits.0 != expected_bits.0 {
			return Err(ErrorKind::BadDifficultyBits.into());
		}

		let mtp = median_time_past(fork, store, height)?;
		if (header.timestamp as i64) <= mtp {
			return Err(ErrorKind::TimestampTooOld.into());
		}
		if (header.timestamp as i64) > self.clock.adjusted_time() + MAX_FUTURE_BLOCK_TIME {
			return Err(ErrorKind::TimestampTooNew.into());
		}

		let bip34 = supermajority_count(fork, store, height, 2)? >= VERSION_ENFORCEMENT_THRESHOLD;
		let bip66 = supermajority_count(fork, store, height, BIP66_VERSION)? >= VERSION_ENFORCEMENT_THRESHOLD;
		let bip65 = supermajority_count(fork, store, height, BIP65_VERSION)? >= VERSION_ENFORCEMENT_THRESHOLD;
		if bip34 && header.version < 2 {
			return Err(ErrorKind::ObsoleteVersion(header.version).into());
		}
		if bip66 && header.version < BIP66_VERSION {
			return Err(ErrorKind::ObsoleteVersion(header.version).into());
		}
		if bip65 && header.version < BIP65_VERSION {
			return Err(ErrorKind::ObsoleteVersion(header.version).into());
		}

		if bip34 {
			let block = &fork.entries[index].block;
			let coinbase = block.coinbase().ok_or(ErrorKind::InvalidCoinbasePosition)?;
			let expected_push = bip34_height_push(height);
			let script_sig = &coinbase.inputs[0].script_sig;
			if !script_sig.starts_with(&expected_push) {
				return Err(ErrorKind::BadCoinbaseHeight.into());
			}
		}

		let block = &fork.entries[index].block;
		for tx in &block.transactions {
			if !tx.is_final_at(height, header.timestamp as i64) {
				return Err(ErrorKind::NonFinalTransaction.into());
			}
		}

		Ok(())
	}

	/// Full UTXO/script validation of `fork.entries[index]`. `fork_spent`
	/// accumulates outpoints consumed earlier in this same organize call
	/// (earlier fork blocks), so a later block cannot re-spend them even
	/// though the store has not yet recorded the spend (§4.3 "ancestor-
	/// visible" double spend detection).
	pub fn connect(
		&self,
		fork: &Fork,
		index: usize,
		store: &dyn ChainStore,
		fork_spent: &mut HashSet<OutPoint>,
		stop: &StopFlag,
	) -> Result<(), Error> {
		let block = &fork.entries[index].block;
		let height = fork.height_at(index);
		let flags = self.script_flags(fork, index, store, height)?;

		let mut fees: u128 = 0;
		for tx in &block.transactions {
			if tx.is_coinbase() {
				continue;
			}
			let mut input_sum: u128 = 0;
			for input in &tx.inputs {
				if stop.is_stopped() {
					return Err(ErrorKind::ServiceStopped.into());
				}
				let outpoint = input.previous_output;
				if fork_spent.contains(&outpoint) {
					return Err(ErrorKind::DoubleSpend.into());
				}
				if store.get_outpoint_spender(&outpoint, fork.height)?.is_some() {
					return Err(ErrorKind::DoubleSpend.into());
				}
				let (output, created_height, is_coinbase) = resolve_output(fork, index, store, &outpoint)?
					.ok_or(ErrorKind::InputMissing)?;
				if is_coinbase && created_height + COINBASE_MATURITY > height {
					return Err(ErrorKind::ImmatureSpend.into());
				}
				self.script
					.verify(&output, input, flags)
					.map_err(ErrorKind::ScriptFailure)?;
				input_sum += output.value as u128;
				fork_spent.insert(outpoint);
			}
			let output_sum = tx.output_value();
			if output_sum > consensus::MAX_MONEY as u128 || input_sum < output_sum {
				return Err(ErrorKind::BadAmount.into());
			}
			fees += input_sum - output_sum;
		}

		let coinbase = block.coinbase().ok_or(ErrorKind::InvalidCoinbasePosition)?;
		let coinbase_out = coinbase.output_value();
		let subsidy = bcnode_core::global::subsidy(height) as u128;
		if coinbase_out > subsidy + fees {
			return Err(ErrorKind::BadCoinbaseAmount.into());
		}

		Ok(())
	}

	fn expected_bits(
		&self,
		fork: &Fork,
		index: usize,
		store: &dyn ChainStore,
		header: &BlockHeader,
	) -> Result<CompactTarget, Error> {
		let height = fork.height_at(index);
		if height % RETARGETING_INTERVAL == 0 {
			let last_height = height - 1;
			let first_height = height
				.checked_sub(RETARGETING_INTERVAL)
				.ok_or_else(|| Error::from(ErrorKind::OperationFailed("retarget window underflows genesis".into())))?;
			let last = header_at(fork, store, last_height)?;
			let first = header_at(fork, store, first_height)?;
			let actual_timespan = last.timestamp as i64 - first.timestamp as i64;
			let max_target = self.config.chain_type.max_target();
			return Ok(retarget(last.bits, actual_timespan, &max_target));
		}

		let prev = header_at(fork, store, height - 1)?;
		if !self.config.chain_type.allows_min_difficulty_blocks() {
			return Ok(prev.bits);
		}

		let gap = header.timestamp as i64 - prev.timestamp as i64;
		if gap > 2 * consensus::TARGET_SPACING as i64 {
			return Ok(CompactTarget::from_biguint(&self.config.chain_type.max_target()));
		}

		let max_bits = CompactTarget::from_biguint(&self.config.chain_type.max_target());
		let mut h = height - 1;
		loop {
			if h == 0 {
				return Ok(header_at(fork, store, 0)?.bits);
			}
			let candidate = header_at(fork, store, h)?;
			if h % RETARGETING_INTERVAL == 0 || candidate.bits.0 != max_bits.0 {
				return Ok(candidate.bits);
			}
			h -= 1;
		}
	}

	fn script_flags(
		&self,
		fork: &Fork,
		index: usize,
		store: &dyn ChainStore,
		height: u64,
	) -> Result<ScriptFlags, Error> {
		let bip66 = supermajority_count(fork, store, height, BIP66_VERSION)? >= VERSION_ENFORCEMENT_THRESHOLD;
		let bip65 = supermajority_count(fork, store, height, BIP65_VERSION)? >= VERSION_ENFORCEMENT_THRESHOLD;
		Ok(ScriptFlags {
			p2sh: height >= BIP16_ACTIVATION_HEIGHT,
			strict_der: bip66,
			checklocktimeverify: bip65,
			witness: false,
		})
	}
}

/// Resolves `height`'s header through the fork for heights above the
/// fork's parent, falling back to the confirmed-chain store otherwise. A
/// missing store header is surfaced as `operation_failed` rather than a
/// validation failure: it means the store has less history than this
/// validation needs, not that the block is malformed (the open question
/// in the design notes about "deprecated as unsafe" header-fetch paths is
/// resolved this way — see DESIGN.md).
fn header_at(fork: &Fork, store: &dyn ChainStore, height: u64) -> Result<BlockHeader, Error> {
	if height > fork.height {
		let idx = (height - fork.height - 1) as usize;
		return fork
			.entries
			.get(idx)
			.map(|e| e.block.header)
			.ok_or_else(|| ErrorKind::OperationFailed("fork height out of range".into()).into());
	}
	store
		.get_header(height)?
		.ok_or_else(|| ErrorKind::OperationFailed(format!("missing header at height {}", height)).into())
}

/// Resolves an outpoint's output, its confirming height, and whether its
/// transaction is a coinbase — searching earlier fork blocks (strictly
/// before `index`) before falling back to the store. Per §4.3, an input
/// may never resolve against a *later* fork block or the same block, nor
/// against the confirmed chain above `fork.height`: those blocks are
/// still sitting in the store above the fork point while this validation
/// runs, and will be orphaned if the reorg succeeds.
fn resolve_output(
	fork: &Fork,
	index: usize,
	store: &dyn ChainStore,
	outpoint: &OutPoint,
) -> Result<Option<(TxOut, u64, bool)>, Error> {
	for j in 0..index {
		let block = &fork.entries[j].block;
		for tx in &block.transactions {
			if tx.hash() == outpoint.tx_hash {
				return Ok(tx
					.outputs
					.get(outpoint.index as usize)
					.map(|out| (out.clone(), fork.height_at(j), tx.is_coinbase())));
			}
		}
	}
	Ok(store.get_output(outpoint, fork.height)?)
}

fn median_time_past(fork: &Fork, store: &dyn ChainStore, height: u64) -> Result<i64, Error> {
	let mut timestamps = Vec::with_capacity(MEDIAN_TIME_PAST_WINDOW);
	let mut h = height;
	for _ in 0..MEDIAN_TIME_PAST_WINDOW {
		if h == 0 {
			break;
		}
		h -= 1;
		timestamps.push(header_at(fork, store, h)?.timestamp as i64);
	}
	if timestamps.is_empty() {
		return Ok(0);
	}
	timestamps.sort_unstable();
	Ok(timestamps[timestamps.len() / 2])
}

fn supermajority_count(fork: &Fork, store: &dyn ChainStore, height: u64, min_version: i32) -> Result<u64, Error> {
	let mut count = 0u64;
	let mut h = height;
	for _ in 0..MAX_VERSION_SAMPLE {
		if h == 0 {
			break;
		}
		h -= 1;
		if header_at(fork, store, h)?.version >= min_version {
			count += 1;
		}
	}
	Ok(count)
}

/// BIP34 minimal-push encoding of a block height, for the coinbase
/// `script_sig` commitment check.
fn bip34_height_push(height: u64) -> Vec<u8> {
	if height == 0 {
		return vec![0x00];
	}
	let mut n = height;
	let mut bytes = Vec::new();
	while n > 0 {
		bytes.push((n & 0xff) as u8);
		n >>= 8;
	}
	if bytes.last().copied().unwrap_or(0) & 0x80 != 0 {
		bytes.push(0x00);
	}
	let mut push = vec![bytes.len() as u8];
	push.extend_from_slice(&bytes);
	push
}
