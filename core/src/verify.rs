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

//! Script execution and proof-of-work verification, consumed as pure
//! functions (§1, §6) — this crate only defines the narrow interfaces;
//! real script interpretation and hash-based PoW checking live outside
//! this workspace's scope.

use num_traits::Zero;

use crate::block::BlockHeader;
use crate::transaction::{TxIn, TxOut};

/// Consensus rule flags active for a given input's script execution,
/// determined by the validator from the spending height (§4.3: BIP16,
/// BIP66, BIP65, witness rules).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptFlags {
	/// BIP16: treat a matching redeem script as pay-to-script-hash.
	pub p2sh: bool,
	/// BIP66: require strict DER-encoded signatures.
	pub strict_der: bool,
	/// BIP65: honor `OP_CHECKLOCKTIMEVERIFY`.
	pub checklocktimeverify: bool,
	/// Segregated witness rules apply to this input.
	pub witness: bool,
}

/// Verifies that `input` correctly satisfies `prev_output`'s locking
/// script under `flags`. A pure function: no store or pool access.
pub trait ScriptVerifier: Send + Sync {
	/// Returns `Ok(())` if the script evaluates to true, `Err(reason)`
	/// otherwise. `reason` is an opaque, human-readable diagnostic — the
	/// organizer only needs to know pass/fail, the reason is for logs.
	fn verify(&self, prev_output: &TxOut, input: &TxIn, flags: ScriptFlags) -> Result<(), String>;
}

/// Verifies a header's proof-of-work hash against its declared target.
/// A pure function of the header's bytes and bits field.
pub trait PowVerifier: Send + Sync {
	/// Returns true if the header's hash satisfies `header.bits`.
	fn verify(&self, header: &BlockHeader) -> bool;
}

/// [`PowVerifier`] backed by the header's own double-SHA256 identity hash
/// interpreted as a big-endian integer, compared against its decoded
/// target — the standard Bitcoin PoW check.
#[derive(Debug, Default)]
pub struct HashPowVerifier;

impl PowVerifier for HashPowVerifier {
	fn verify(&self, header: &BlockHeader) -> bool {
		use crate::hash::Hashed;
		use num_bigint::BigUint;

		let hash_num = BigUint::from_bytes_be(header.hash().as_bytes());
		let target = header.bits.to_biguint();
		!target.is_zero() && hash_num <= target
	}
}

const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKSIGVERIFY: u8 = 0xad;
const OP_CHECKMULTISIG: u8 = 0xae;
const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;
const MAX_PUBKEYS_PER_MULTISIG: u64 = 20;

/// Legacy (pre-segwit) signature operation count for a single script,
/// following Bitcoin Core's static `GetSigOpCount`: each checksig opcode
/// counts as one, each checkmultisig counts as the maximum possible
/// (`MAX_PUBKEYS_PER_MULTISIG`) since the true count requires decoding the
/// preceding push, which this opaque-script crate does not interpret.
pub fn legacy_sigop_count(script: &[u8]) -> u64 {
	script
		.iter()
		.map(|&op| match op {
			OP_CHECKSIG | OP_CHECKSIGVERIFY => 1,
			OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => MAX_PUBKEYS_PER_MULTISIG,
			_ => 0,
		})
		.sum()
}
