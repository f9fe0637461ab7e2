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

//! An in-memory [`ChainStore`] implementation. This is a reference/test
//! double, not a production storage engine (§4.8): every crate's own test
//! module builds one of these to exercise the organizer and pool logic
//! without a real database.

use std::collections::HashMap;

use bcnode_core::{Block, BlockHeader, Difficulty, Hash, Hashed, OutPoint, Transaction, TxOut};
use bcnode_util::Mutex;
use log::debug;

use crate::error::{Error, ErrorKind};
use crate::types::ChainStore;

struct State {
	/// Confirmed blocks, in ascending height order; `blocks[h]` is the
	/// block confirmed at height `h`.
	blocks: Vec<Block>,
	hash_to_height: HashMap<Hash, u64>,
	/// Which transaction spends a given outpoint, once confirmed, and the
	/// height that spend was confirmed at.
	spenders: HashMap<OutPoint, (Hash, u64)>,
	/// tx hash -> (height, index within block), to answer `get_transaction`.
	tx_index: HashMap<Hash, (u64, usize)>,
}

impl State {
	fn new() -> State {
		State {
			blocks: Vec::new(),
			hash_to_height: HashMap::new(),
			spenders: HashMap::new(),
			tx_index: HashMap::new(),
		}
	}

	fn index_block(&mut self, height: u64, block: &Block) {
		self.hash_to_height.insert(block.hash(), height);
		for (i, tx) in block.transactions.iter().enumerate() {
			self.tx_index.insert(tx.hash(), (height, i));
			if !tx.is_coinbase() {
				for input in &tx.inputs {
					self.spenders.insert(input.previous_output, (tx.hash(), height));
				}
			}
		}
	}

	fn unindex_block(&mut self, block: &Block) {
		self.hash_to_height.remove(&block.hash());
		for tx in &block.transactions {
			self.tx_index.remove(&tx.hash());
			if !tx.is_coinbase() {
				for input in &tx.inputs {
					self.spenders.remove(&input.previous_output);
				}
			}
		}
	}
}

/// Reference implementation of the fast-chain store contract, backed by
/// plain in-memory collections behind a single mutex so `pop_above`/`push`
/// are trivially atomic.
pub struct MemoryChainStore {
	state: Mutex<State>,
}

impl Default for MemoryChainStore {
	fn default() -> Self {
		MemoryChainStore { state: Mutex::new(State::new()) }
	}
}

impl MemoryChainStore {
	/// Builds an empty store (no genesis block pushed yet).
	pub fn new() -> MemoryChainStore {
		MemoryChainStore::default()
	}
}

impl ChainStore for MemoryChainStore {
	fn get_height(&self, hash: &Hash) -> Result<Option<u64>, Error> {
		Ok(self.state.lock().hash_to_height.get(hash).copied())
	}

	fn get_block_exists(&self, hash: &Hash) -> Result<bool, Error> {
		Ok(self.state.lock().hash_to_height.contains_key(hash))
	}

	fn get_header(&self, height: u64) -> Result<Option<BlockHeader>, Error> {
		let state = self.state.lock();
		Ok(state.blocks.get(height as usize).map(|b| b.header))
	}

	fn get_tip_header(&self) -> Result<Option<BlockHeader>, Error> {
		let state = self.state.lock();
		Ok(state.blocks.last().map(|b| b.header))
	}

	fn get_tip_height(&self) -> Result<Option<u64>, Error> {
		let state = self.state.lock();
		Ok(state.blocks.len().checked_sub(1).map(|h| h as u64))
	}

	fn get_transaction(&self, hash: &Hash) -> Result<Option<(Transaction, u64)>, Error> {
		let state = self.state.lock();
		Ok(state.tx_index.get(hash).map(|&(height, idx)| {
			(state.blocks[height as usize].transactions[idx].clone(), height)
		}))
	}

	fn get_outpoint_spender(&self, outpoint: &OutPoint, max_height: u64) -> Result<Option<Hash>, Error> {
		let state = self.state.lock();
		Ok(state.spenders.get(outpoint).filter(|(_, height)| *height <= max_height).map(|(hash, _)| *hash))
	}

	fn get_output(&self, outpoint: &OutPoint, max_height: u64) -> Result<Option<(TxOut, u64, bool)>, Error> {
		let state = self.state.lock();
		let (height, idx) = match state.tx_index.get(&outpoint.tx_hash) {
			Some(v) => *v,
			None => return Ok(None),
		};
		if height > max_height {
			return Ok(None);
		}
		let tx = &state.blocks[height as usize].transactions[idx];
		let output = match tx.outputs.get(outpoint.index as usize) {
			Some(o) => o.clone(),
			None => return Ok(None),
		};
		Ok(Some((output, height, tx.is_coinbase())))
	}

	fn get_fork_difficulty(&self, from_height: u64) -> Result<Difficulty, Error> {
		let state = self.state.lock();
		let start = from_height as usize;
		if start >= state.blocks.len() {
			return Ok(Difficulty::zero());
		}
		Ok(state.blocks[start..]
			.iter()
			.map(|b| Difficulty::from_target(b.header.bits))
			.sum())
	}

	fn pop_above(&self, fork_parent_hash: &Hash) -> Result<Vec<Block>, Error> {
		let mut state = self.state.lock();
		let parent_height = match state.hash_to_height.get(fork_parent_hash) {
			Some(h) => *h,
			None => {
				// An empty-chain parent (genesis's own parent) pops everything.
				if state.blocks.is_empty() {
					return Ok(Vec::new());
				}
				return Err(ErrorKind::NotOnChain.into());
			}
		};

		let mut popped = Vec::new();
		while state.blocks.len() as u64 > parent_height + 1 {
			let block = state.blocks.pop().unwrap();
			state.unindex_block(&block);
			popped.push(block);
		}
		popped.reverse();
		debug!("pop_above: popped {} block(s) above {:?}", popped.len(), fork_parent_hash);
		Ok(popped)
	}

	fn push(&self, block: Block, height: u64) -> Result<(), Error> {
		let mut state = self.state.lock();
		let expected = state.blocks.len() as u64;
		if height != expected {
			return Err(ErrorKind::HeightMismatch(expected, height).into());
		}
		state.index_block(height, &block);
		state.blocks.push(block);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bcnode_core::{BlockHeader, CompactTarget};

	fn header(prev: Hash, nonce: u32) -> BlockHeader {
		BlockHeader {
			version: 1,
			prev_hash: prev,
			merkle_root: bcnode_core::hash::ZERO_HASH,
			timestamp: 0,
			bits: CompactTarget(0x1d00ffff),
			nonce,
		}
	}

	fn block(prev: Hash, nonce: u32) -> Block {
		Block { header: header(prev, nonce), transactions: vec![] }
	}

	#[test]
	fn push_then_pop_above_is_atomic_and_reversible() {
		let store = MemoryChainStore::new();
		let genesis = block(bcnode_core::hash::ZERO_HASH, 0);
		let genesis_hash = genesis.hash();
		store.push(genesis, 0).unwrap();

		let b1 = block(genesis_hash, 1);
		let b1_hash = b1.hash();
		store.push(b1, 1).unwrap();
		let b2 = block(b1_hash, 2);
		store.push(b2.clone(), 2).unwrap();

		assert_eq!(store.get_tip_height().unwrap(), Some(2));

		let popped = store.pop_above(&genesis_hash).unwrap();
		assert_eq!(popped.len(), 2);
		assert_eq!(popped[0].hash(), b1_hash);
		assert_eq!(popped[1].hash(), b2.hash());
		assert_eq!(store.get_tip_height().unwrap(), Some(0));
		assert!(!store.get_block_exists(&b1_hash).unwrap());
	}

	#[test]
	fn push_rejects_wrong_height() {
		let store = MemoryChainStore::new();
		let genesis = block(bcnode_core::hash::ZERO_HASH, 0);
		assert!(store.push(genesis, 5).is_err());
	}
}
