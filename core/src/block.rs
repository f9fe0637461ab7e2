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

//! Block headers and blocks.

use serde::{Deserialize, Serialize};

use crate::hash::{double_sha256, Hash, Hashed};
use crate::merkle::merkle_root;
use crate::target::CompactTarget;
use crate::transaction::Transaction;

/// A proof-of-work header. Identical in shape to Bitcoin's: everything a
/// header commits to is here, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
	/// Header/consensus-rule version.
	pub version: i32,
	/// Hash of the previous block's header.
	pub prev_hash: Hash,
	/// Root of the merkle tree over this block's transaction hashes.
	pub merkle_root: Hash,
	/// Seconds since the Unix epoch, miner-supplied.
	pub timestamp: u32,
	/// Compact-encoded proof-of-work target.
	pub bits: CompactTarget,
	/// Proof-of-work nonce.
	pub nonce: u32,
}

impl BlockHeader {
	/// Canonical serialization used for hashing. See the note on
	/// [`crate::transaction::Transaction::encode`] — not a byte-for-byte
	/// claim on the real wire format, which is out of scope.
	pub fn encode(&self) -> Vec<u8> {
		bincode::serialize(self).expect("header serialization is infallible")
	}
}

impl Hashed for BlockHeader {
	fn hash(&self) -> Hash {
		double_sha256(&self.encode())
	}
}

/// A full block: a header plus its ordered transactions. By convention the
/// first transaction is the coinbase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
	/// The block's header.
	pub header: BlockHeader,
	/// Ordered transactions; `transactions[0]` is the coinbase.
	pub transactions: Vec<Transaction>,
}

impl Block {
	/// The block hash is simply its header's hash.
	pub fn hash(&self) -> Hash {
		self.header.hash()
	}

	/// The coinbase transaction, if this block is well-formed enough to
	/// have one (non-empty transaction list).
	pub fn coinbase(&self) -> Option<&Transaction> {
		self.transactions.first()
	}

	/// Recomputes the merkle root from the current transaction list —
	/// compared against `header.merkle_root` by the validator's `check`
	/// phase, not trusted here.
	pub fn computed_merkle_root(&self) -> Hash {
		let hashes: Vec<Hash> = self.transactions.iter().map(Hashed::hash).collect();
		merkle_root(&hashes)
	}

	/// Serialized size in bytes, used against `consensus::MAX_BLOCK_SIZE`.
	pub fn serialized_size(&self) -> usize {
		bincode::serialized_size(self).expect("block serialization is infallible") as usize
	}
}

impl Hashed for Block {
	fn hash(&self) -> Hash {
		self.hash()
	}
}
