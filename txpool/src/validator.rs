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

//! The transaction validator: context-free `check`, contextual `accept`,
//! and full `connect` — the same three-phase split as the block validator
//! (§4.3), scaled down to a single transaction with no fork to walk.

use std::collections::HashSet;

use bcnode_core::consensus::{
	BIP16_ACTIVATION_HEIGHT, COINBASE_MATURITY, MAX_MONEY, MAX_STANDARD_TX_SIZE, MIN_RELAY_FEE_RATE,
};
use bcnode_core::{Clock, OutPoint, ScriptFlags, ScriptVerifier, Transaction, TxOut};
use bcnode_store::ChainStore;

use crate::error::{Error, ErrorKind};
use crate::pool::TransactionPool;

/// Bundles the pure-function collaborators the transaction validator
/// needs, mirroring the block validator's shape without a proof-of-work
/// check (no header in play).
pub struct TxValidator<'a> {
	pub script: &'a dyn ScriptVerifier,
	pub clock: &'a dyn Clock,
}

impl<'a> TxValidator<'a> {
	/// Context-free structural checks.
	pub fn check(&self, tx: &Transaction) -> Result<(), Error> {
		if tx.is_coinbase() {
			return Err(ErrorKind::UnexpectedCoinbase.into());
		}
		if tx.inputs.is_empty() || tx.outputs.is_empty() {
			return Err(ErrorKind::MalformedTransaction.into());
		}
		if tx.serialized_size() > MAX_STANDARD_TX_SIZE {
			return Err(ErrorKind::OversizedTransaction.into());
		}
		let mut seen = HashSet::new();
		for input in &tx.inputs {
			if !seen.insert(input.previous_output) {
				return Err(ErrorKind::MalformedTransaction.into());
			}
		}
		Ok(())
	}

	/// Contextual finality check against the height/time the transaction
	/// would next be eligible for confirmation (the store's tip + 1).
	pub fn accept(&self, tx: &Transaction, next_height: u64) -> Result<(), Error> {
		if !tx.is_final_at(next_height, self.clock.adjusted_time()) {
			return Err(ErrorKind::NonFinalTransaction.into());
		}
		Ok(())
	}

	/// Full UTXO/script validation against both the confirmed chain and
	/// the pool's own unconfirmed outputs. Returns the transaction's fee
	/// on success.
	pub fn connect(
		&self,
		tx: &Transaction,
		store: &dyn ChainStore,
		pool: &TransactionPool,
		next_height: u64,
	) -> Result<u64, Error> {
		let flags =
			ScriptFlags { p2sh: next_height >= BIP16_ACTIVATION_HEIGHT, strict_der: true, checklocktimeverify: true, witness: false };

		let tip_height = next_height.saturating_sub(1);
		let mut input_sum: u128 = 0;
		for input in &tx.inputs {
			let outpoint = input.previous_output;
			if pool.spender_of(&outpoint).is_some()
				|| store.get_outpoint_spender(&outpoint, tip_height)?.is_some()
			{
				return Err(ErrorKind::DoubleSpend.into());
			}
			let (output, created_height, is_coinbase) =
				resolve_output(&outpoint, store, pool, tip_height)?.ok_or(ErrorKind::InputMissing)?;
			if is_coinbase && created_height + COINBASE_MATURITY > next_height {
				return Err(ErrorKind::ImmatureSpend.into());
			}
			self.script.verify(&output, input, flags).map_err(ErrorKind::ScriptFailure)?;
			input_sum += output.value as u128;
		}

		let output_sum = tx.output_value();
		if output_sum > MAX_MONEY as u128 || input_sum < output_sum {
			return Err(ErrorKind::BadAmount.into());
		}
		let fee = (input_sum - output_sum) as u64;

		let size = tx.serialized_size().max(1) as u64;
		let fee_rate = fee.saturating_mul(1000) / size;
		if fee_rate < MIN_RELAY_FEE_RATE {
			return Err(ErrorKind::FeeTooLow.into());
		}

		Ok(fee)
	}
}

/// Resolves an outpoint's output, preferring an unconfirmed pool entry
/// (never a coinbase, so maturity never applies) over the confirmed
/// chain store.
fn resolve_output(
	outpoint: &OutPoint,
	store: &dyn ChainStore,
	pool: &TransactionPool,
	max_height: u64,
) -> Result<Option<(TxOut, u64, bool)>, Error> {
	if let Some(output) = pool.find_output(outpoint) {
		return Ok(Some((output, 0, false)));
	}
	Ok(store.get_output(outpoint, max_height)?)
}
