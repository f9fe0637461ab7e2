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

//! Transactions, inputs and outputs. Script bytes are carried opaquely —
//! interpreting them is the script engine's job, consumed through
//! [`crate::script::ScriptVerifier`] as a pure function, never this crate's.

use serde::{Deserialize, Serialize};

use crate::hash::{double_sha256, Hash, Hashed};
use crate::outpoint::OutPoint;

/// A single transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
	/// The output being spent.
	pub previous_output: OutPoint,
	/// Opaque unlocking script bytes (scriptSig / witness stack, flattened).
	pub script_sig: Vec<u8>,
	/// BIP68 relative-locktime / replace-by-fee sequence number.
	pub sequence: u32,
}

impl TxIn {
	/// Whether this input is the coinbase's synthetic input.
	pub fn is_coinbase(&self) -> bool {
		self.previous_output.is_null()
	}
}

/// A single transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
	/// Value in satoshis.
	pub value: u64,
	/// Opaque locking script bytes.
	pub script_pubkey: Vec<u8>,
}

/// A transaction: a set of inputs consuming existing outputs and a set of
/// outputs creating new ones, plus a locktime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Format version.
	pub version: i32,
	/// Spent outpoints and their unlocking scripts.
	pub inputs: Vec<TxIn>,
	/// Newly created outputs.
	pub outputs: Vec<TxOut>,
	/// Absolute locktime: a block height (< 500,000,000) or a Unix
	/// timestamp (>=), below which the transaction may not be mined.
	pub lock_time: u32,
}

/// Locktime values at or above this are interpreted as a Unix timestamp
/// rather than a block height.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Final sequence number: when every input carries it, `lock_time` is not
/// enforced regardless of its value.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

impl Transaction {
	/// A transaction is final (ignoring its own locktime) once every input
	/// opts out of locktime enforcement.
	pub fn all_inputs_final(&self) -> bool {
		self.inputs.iter().all(|i| i.sequence == SEQUENCE_FINAL)
	}

	/// Whether this transaction may be included at `height`/`time`: final
	/// regardless of locktime, or its locktime has already passed
	/// (interpreted as a block height below `LOCKTIME_THRESHOLD`, a Unix
	/// timestamp otherwise). Shared by the block and transaction
	/// validators so the rule cannot drift between the two.
	pub fn is_final_at(&self, height: u64, time: i64) -> bool {
		if self.all_inputs_final() {
			return true;
		}
		if self.lock_time < LOCKTIME_THRESHOLD {
			(self.lock_time as u64) < height
		} else {
			(self.lock_time as i64) < time
		}
	}

	/// Whether this transaction is the coinbase: exactly one input, and
	/// that input spends the null outpoint.
	pub fn is_coinbase(&self) -> bool {
		self.inputs.len() == 1 && self.inputs[0].is_coinbase()
	}

	/// Sum of all output values. Does not validate the money range; callers
	/// needing that invariant check it separately against consensus limits.
	pub fn output_value(&self) -> u128 {
		self.outputs.iter().map(|o| o.value as u128).sum()
	}

	/// Canonical serialization used for hashing and size-bound checks. Not
	/// claimed to be the Bitcoin wire format byte-for-byte — the network
	/// codec is out of this workspace's scope (§1) — only that it is
	/// deterministic and round-trips within this workspace.
	pub fn encode(&self) -> Vec<u8> {
		bincode::serialize(self).expect("transaction serialization is infallible")
	}

	/// Serialized size in bytes, used for the standard-size and fee-rate
	/// bounds.
	pub fn serialized_size(&self) -> usize {
		bincode::serialized_size(self).expect("transaction serialization is infallible") as usize
	}
}

impl Hashed for Transaction {
	fn hash(&self) -> Hash {
		double_sha256(&self.encode())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn out(value: u64) -> TxOut {
		TxOut { value, script_pubkey: vec![] }
	}

	#[test]
	fn coinbase_detection_requires_single_null_input() {
		let coinbase = Transaction {
			version: 1,
			inputs: vec![TxIn {
				previous_output: OutPoint::null(),
				script_sig: vec![0x03, 0x01, 0x02, 0x03],
				sequence: SEQUENCE_FINAL,
			}],
			outputs: vec![out(50_0000_0000)],
			lock_time: 0,
		};
		assert!(coinbase.is_coinbase());

		let spend = Transaction {
			version: 1,
			inputs: vec![TxIn {
				previous_output: OutPoint::new(Hash([7u8; 32]), 0),
				script_sig: vec![],
				sequence: SEQUENCE_FINAL,
			}],
			outputs: vec![out(1)],
			lock_time: 0,
		};
		assert!(!spend.is_coinbase());
	}

	#[test]
	fn hash_is_deterministic() {
		let tx = Transaction {
			version: 1,
			inputs: vec![],
			outputs: vec![out(1)],
			lock_time: 0,
		};
		assert_eq!(tx.hash(), tx.hash());
	}
}
