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

//! The transaction pool (C5): a bounded FIFO of unconfirmed transactions
//! with dependency-aware eviction and post-reorg reconciliation.

use std::collections::{HashSet, VecDeque};

use bcnode_core::{Block, Hash, Hashed, OutPoint, StopFlag, Transaction, TxIn, TxOut};

use crate::entry::{Handler, Outcome, TransactionEntry};
use crate::error::ErrorKind;

/// Bounded FIFO of [`TransactionEntry`], keyed implicitly by hash
/// (membership and dependency lookups scan the small in-memory buffer —
/// appropriate for a reference/test-scale pool, not a production mempool
/// index).
pub struct TransactionPool {
	entries: VecDeque<TransactionEntry>,
	capacity: usize,
	stop: StopFlag,
}

impl TransactionPool {
	/// Builds an empty pool bounded at `capacity` entries, sharing `stop`
	/// with the organizer pair so a node-wide stop silences pool mutation
	/// too (aside from `delete_all`, which always drains).
	pub fn new(capacity: usize, stop: StopFlag) -> TransactionPool {
		TransactionPool { entries: VecDeque::new(), capacity, stop }
	}

	/// Number of entries currently pooled.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the pool holds no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Whether a transaction with this hash is already pooled.
	pub fn contains(&self, hash: &Hash) -> bool {
		self.entries.iter().any(|e| e.hash == *hash)
	}

	/// The output an in-pool transaction created, if any — consulted by
	/// the organizer's `connect` before falling back to the confirmed
	/// chain store, since an unconfirmed transaction may spend another
	/// pooled transaction's output (§3 "Transaction Pool" invariant).
	pub fn find_output(&self, outpoint: &OutPoint) -> Option<TxOut> {
		self.entries
			.iter()
			.find(|e| e.hash == outpoint.tx_hash)
			.and_then(|e| e.tx.outputs.get(outpoint.index as usize).cloned())
	}

	/// Hash of the pooled transaction that already spends `outpoint`, if
	/// any — a pool-internal double-spend conflict.
	pub fn spender_of(&self, outpoint: &OutPoint) -> Option<Hash> {
		self.entries
			.iter()
			.find(|e| e.tx.inputs.iter().any(|i| i.previous_output == *outpoint))
			.map(|e| e.hash)
	}

	/// Up to `max` pooled transaction hashes, oldest first.
	pub fn fetch_inventory(&self, max: usize) -> Vec<Hash> {
		self.entries.iter().take(max).map(|e| e.hash).collect()
	}

	/// Inserts `tx` with its completion `handler`. Always fires the
	/// handler exactly once, whether the insertion succeeds, the pool is
	/// stopped, the pool is zero-capacity, or the hash is a duplicate
	/// (§9 "always fire exactly once" resolution of the zero-capacity
	/// open question).
	pub fn add(&mut self, tx: Transaction, handler: Handler) {
		if self.stop.is_stopped() {
			handler(Outcome::Failure(ErrorKind::ServiceStopped).into_result());
			return;
		}
		if self.capacity == 0 {
			handler(Outcome::Failure(ErrorKind::PoolFilled).into_result());
			return;
		}
		let hash = tx.hash();
		if self.contains(&hash) {
			handler(Outcome::Failure(ErrorKind::Duplicate).into_result());
			return;
		}
		while self.entries.len() >= self.capacity {
			let evicted = self.entries.pop_front().expect("len >= capacity > 0");
			let descendants = self.transitive_dependents(evicted.hash);
			evicted.fire(Outcome::Failure(ErrorKind::PoolFilled));
			if !descendants.is_empty() {
				self.remove_by_hashes(&descendants, ErrorKind::PoolFilled);
			}
		}
		self.entries.push_back(TransactionEntry::new(tx, handler));
	}

	/// Invokes every handler with `ec` and empties the pool. The one
	/// operation that still runs while stopped (§4.5).
	pub fn delete_all(&mut self, ec: ErrorKind) {
		for entry in self.entries.drain(..) {
			entry.fire(Outcome::Failure(ec.clone()));
		}
	}

	/// Removes the oldest entry and its transitive in-pool descendants.
	/// A no-op while stopped or if the pool is empty.
	pub fn delete_package(&mut self, ec: ErrorKind) {
		if self.stop.is_stopped() {
			return;
		}
		let anchor = match self.entries.front() {
			Some(e) => e.hash,
			None => return,
		};
		self.delete_package_from(&anchor, ec);
	}

	/// Removes `hash`'s entry and its transitive in-pool descendants.
	/// No-op if `hash` is not pooled or the pool is stopped.
	pub fn delete_package_from(&mut self, hash: &Hash, ec: ErrorKind) {
		if self.stop.is_stopped() || !self.contains(hash) {
			return;
		}
		let mut closure = self.transitive_dependents(*hash);
		closure.insert(*hash);
		self.remove_by_hashes(&closure, ec);
	}

	/// Removes only the matching entry, no dependents. No-op if not
	/// pooled or the pool is stopped.
	pub fn delete_single(&mut self, hash: &Hash, outcome: Outcome) {
		if self.stop.is_stopped() {
			return;
		}
		if let Some(index) = self.entries.iter().position(|e| e.hash == *hash) {
			if let Some(entry) = self.entries.remove(index) {
				entry.fire(outcome);
			}
		}
	}

	/// Removes every entry that transitively depends on `outpoint`,
	/// preserving whichever entry (if any) created it.
	pub fn delete_dependencies_of_outpoint(&mut self, outpoint: &OutPoint, ec: ErrorKind) {
		if self.stop.is_stopped() {
			return;
		}
		let direct: Vec<Hash> = self
			.entries
			.iter()
			.filter(|e| e.tx.inputs.iter().any(|i| i.previous_output == *outpoint))
			.map(|e| e.hash)
			.collect();
		let closure = self.transitive_from(direct);
		self.remove_by_hashes(&closure, ec);
	}

	/// Removes every entry that transitively depends on any output of
	/// `hash`, preserving `hash`'s own entry.
	pub fn delete_dependencies_of_hash(&mut self, hash: &Hash, ec: ErrorKind) {
		if self.stop.is_stopped() {
			return;
		}
		let closure = self.transitive_dependents(*hash);
		self.remove_by_hashes(&closure, ec);
	}

	/// Removes every entry with an input matching `predicate`, and their
	/// transitive dependents.
	pub fn delete_dependencies_by<F>(&mut self, predicate: F, ec: ErrorKind)
	where
		F: Fn(&TxIn) -> bool,
	{
		if self.stop.is_stopped() {
			return;
		}
		let direct: Vec<Hash> =
			self.entries.iter().filter(|e| e.tx.inputs.iter().any(&predicate)).map(|e| e.hash).collect();
		let closure = self.transitive_from(direct);
		self.remove_by_hashes(&closure, ec);
	}

	/// For every transaction confirmed in `blocks`, removes its pool entry
	/// (if any) and reports success — the post-reorg reconciliation hook's
	/// first half (§4.5 `delete_confirmed_in_blocks`).
	pub fn delete_confirmed_in_blocks(&mut self, blocks: &[Block]) {
		if self.stop.is_stopped() {
			return;
		}
		for block in blocks {
			for tx in &block.transactions {
				self.delete_single(&tx.hash(), Outcome::Success);
			}
		}
	}

	/// For every non-coinbase input spent in `blocks`, purges any pooled
	/// transaction (and its dependents) that conflicts with it — the
	/// reconciliation hook's second half (§4.5 `delete_spent_in_blocks`).
	pub fn delete_spent_in_blocks(&mut self, blocks: &[Block]) {
		if self.stop.is_stopped() {
			return;
		}
		for block in blocks {
			for tx in &block.transactions {
				if tx.is_coinbase() {
					continue;
				}
				for input in &tx.inputs {
					self.delete_dependencies_of_outpoint(&input.previous_output, ErrorKind::DoubleSpend);
				}
			}
		}
	}

	/// `delete_confirmed_in_blocks` followed by `delete_spent_in_blocks`
	/// in one pass — the composition the organizer runs after every
	/// reorganization.
	pub fn delete_superseded(&mut self, blocks: &[Block]) {
		self.delete_confirmed_in_blocks(blocks);
		self.delete_spent_in_blocks(blocks);
	}

	fn direct_dependents(&self, hash: Hash) -> Vec<Hash> {
		self.entries
			.iter()
			.filter(|e| e.tx.inputs.iter().any(|i| i.previous_output.tx_hash == hash))
			.map(|e| e.hash)
			.collect()
	}

	/// Transitive closure of `direct_dependents`, seeded from `hash`
	/// itself but not including it.
	fn transitive_dependents(&self, hash: Hash) -> HashSet<Hash> {
		self.transitive_from(self.direct_dependents(hash))
	}

	fn transitive_from(&self, direct: Vec<Hash>) -> HashSet<Hash> {
		let mut closure = HashSet::new();
		let mut frontier = VecDeque::new();
		for hash in direct {
			if closure.insert(hash) {
				frontier.push_back(hash);
			}
		}
		while let Some(hash) = frontier.pop_front() {
			for dep in self.direct_dependents(hash) {
				if closure.insert(dep) {
					frontier.push_back(dep);
				}
			}
		}
		closure
	}

	fn remove_by_hashes(&mut self, hashes: &HashSet<Hash>, ec: ErrorKind) {
		if hashes.is_empty() {
			return;
		}
		let mut remaining = VecDeque::with_capacity(self.entries.len());
		for entry in self.entries.drain(..) {
			if hashes.contains(&entry.hash) {
				entry.fire(Outcome::Failure(ec.clone()));
			} else {
				remaining.push_back(entry);
			}
		}
		self.entries = remaining;
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use bcnode_util::Mutex;

	use super::*;

	fn tx(seed: u8, spend: Option<(Hash, u32)>) -> Transaction {
		Transaction {
			version: 1,
			inputs: vec![TxIn {
				previous_output: spend.map(|(h, i)| OutPoint::new(h, i)).unwrap_or_else(OutPoint::null),
				script_sig: vec![seed],
				sequence: bcnode_core::transaction::SEQUENCE_FINAL,
			}],
			outputs: vec![TxOut { value: 1000, script_pubkey: vec![] }],
			lock_time: 0,
		}
	}

	type Log = Arc<Mutex<Vec<(Hash, bool)>>>;

	fn recording_handler(hash: Hash, log: Log) -> Handler {
		Box::new(move |result| log.lock().push((hash, result.is_ok())))
	}

	#[test]
	fn overflow_eviction_removes_dependents_transitively() {
		let log: Log = Arc::new(Mutex::new(Vec::new()));
		let mut pool = TransactionPool::new(3, StopFlag::new());

		let t0 = tx(0, None);
		let t0_hash = t0.hash();
		let t1 = tx(1, Some((t0_hash, 0)));
		let t1_hash = t1.hash();
		let t2 = tx(2, Some((t1_hash, 0)));
		let t2_hash = t2.hash();
		let t3 = tx(3, None);
		let t3_hash = t3.hash();

		pool.add(t0, recording_handler(t0_hash, log.clone()));
		pool.add(t1, recording_handler(t1_hash, log.clone()));
		pool.add(t2, recording_handler(t2_hash, log.clone()));
		assert_eq!(pool.len(), 3);

		pool.add(t3, recording_handler(t3_hash, log.clone()));
		assert_eq!(pool.len(), 1);
		assert!(pool.contains(&t3_hash));

		let fired = log.lock();
		assert_eq!(fired.len(), 3);
		assert!(fired.iter().all(|(_, ok)| !ok));
		for hash in [t0_hash, t1_hash, t2_hash] {
			assert!(fired.iter().any(|(h, _)| *h == hash));
		}
	}

	#[test]
	fn zero_capacity_always_fires_pool_filled() {
		let log: Log = Arc::new(Mutex::new(Vec::new()));
		let mut pool = TransactionPool::new(0, StopFlag::new());
		let t0 = tx(0, None);
		let hash = t0.hash();
		pool.add(t0, recording_handler(hash, log.clone()));
		assert_eq!(pool.len(), 0);
		assert_eq!(log.lock().as_slice(), &[(hash, false)]);
	}

	#[test]
	fn stopped_pool_rejects_add_but_delete_all_still_drains() {
		let log: Log = Arc::new(Mutex::new(Vec::new()));
		let stop = StopFlag::new();
		let mut pool = TransactionPool::new(10, stop.clone());
		let t0 = tx(0, None);
		let hash = t0.hash();
		pool.add(t0, recording_handler(hash, log.clone()));
		assert_eq!(pool.len(), 1);

		stop.stop();
		let t1 = tx(1, None);
		let t1_hash = t1.hash();
		pool.add(t1, recording_handler(t1_hash, log.clone()));
		assert_eq!(pool.len(), 1, "add must no-op while stopped");
		assert!(log.lock().iter().any(|(h, ok)| *h == t1_hash && !*ok));

		pool.delete_all(ErrorKind::ServiceStopped);
		assert!(pool.is_empty(), "delete_all must still drain while stopped");
		assert!(log.lock().iter().any(|(h, ok)| *h == hash && !*ok));
	}

	#[test]
	fn delete_spent_in_blocks_purges_conflicting_pool_entry() {
		let log: Log = Arc::new(Mutex::new(Vec::new()));
		let mut pool = TransactionPool::new(10, StopFlag::new());
		let confirmed_input = tx(0, None);
		let confirmed_hash = confirmed_input.hash();

		let conflicting = tx(9, Some((confirmed_hash, 0)));
		let conflicting_hash = conflicting.hash();
		pool.add(conflicting, recording_handler(conflicting_hash, log.clone()));

		let block = Block {
			header: bcnode_core::BlockHeader {
				version: 1,
				prev_hash: bcnode_core::hash::ZERO_HASH,
				merkle_root: bcnode_core::hash::ZERO_HASH,
				timestamp: 0,
				bits: bcnode_core::CompactTarget(0x207fffff),
				nonce: 0,
			},
			transactions: vec![confirmed_input, tx(1, Some((confirmed_hash, 0)))],
		};
		pool.delete_spent_in_blocks(std::slice::from_ref(&block));

		assert!(pool.is_empty());
		assert!(log.lock().iter().any(|(h, ok)| *h == conflicting_hash && !*ok));
	}
}
