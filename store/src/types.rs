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

//! The "fast chain" store contract (§6): read/write of headers,
//! transactions, outpoints and fork difficulty, plus the two atomic
//! operations (`pop_above`, `push`) the organizer uses to swap the
//! confirmed chain's tip. This is the narrow interface to an external
//! collaborator (§1) — the persistence engine behind it is out of scope.

use bcnode_core::{Block, BlockHeader, Difficulty, Hash, OutPoint, Transaction};

use crate::error::Error;

/// The confirmed chain, as seen through its external read/write contract.
pub trait ChainStore: Send + Sync {
	/// Height of the confirmed block with the given hash, if any.
	fn get_height(&self, hash: &Hash) -> Result<Option<u64>, Error>;

	/// Whether a block with the given hash is already confirmed.
	fn get_block_exists(&self, hash: &Hash) -> Result<bool, Error>;

	/// The header confirmed at `height`, if the chain is that tall.
	fn get_header(&self, height: u64) -> Result<Option<BlockHeader>, Error>;

	/// The confirmed header at the current tip, if the chain is non-empty.
	fn get_tip_header(&self) -> Result<Option<BlockHeader>, Error>;

	/// Current tip height. Returns `None` before genesis.
	fn get_tip_height(&self) -> Result<Option<u64>, Error>;

	/// A confirmed transaction and the height it was confirmed at.
	fn get_transaction(&self, hash: &Hash) -> Result<Option<(Transaction, u64)>, Error>;

	/// The hash of the transaction that spends `outpoint`, if confirmed at
	/// a height no greater than `max_height`. A spend confirmed above
	/// `max_height` must be invisible to the caller: during a reorg the
	/// store still holds the soon-to-be-orphaned blocks above the fork
	/// point while validation runs, and those blocks' spends must not
	/// leak into a fork being validated against an earlier ancestor.
	fn get_outpoint_spender(&self, outpoint: &OutPoint, max_height: u64) -> Result<Option<Hash>, Error>;

	/// The confirmed output referenced by `outpoint`, and the height its
	/// containing transaction was confirmed at (needed for coinbase
	/// maturity checks) — `None` if it was confirmed above `max_height`,
	/// for the same reason `get_outpoint_spender` is bounded.
	fn get_output(
		&self,
		outpoint: &OutPoint,
		max_height: u64,
	) -> Result<Option<(bcnode_core::TxOut, u64, bool)>, Error>;

	/// Cumulative difficulty of the confirmed chain from `from_height` to
	/// the tip (inclusive).
	fn get_fork_difficulty(&self, from_height: u64) -> Result<Difficulty, Error>;

	/// Atomically removes every confirmed block above `fork_parent_hash`,
	/// returning them in ascending height order. `fork_parent_hash` must
	/// itself remain on the chain. No intermediate state is observable by
	/// any other store operation while this is in progress (§8 "Atomic
	/// reorg").
	fn pop_above(&self, fork_parent_hash: &Hash) -> Result<Vec<Block>, Error>;

	/// Atomically appends `block` as the new tip at `height`, which must be
	/// exactly one more than the current tip height (or zero, for
	/// genesis).
	fn push(&self, block: Block, height: u64) -> Result<(), Error>;
}
