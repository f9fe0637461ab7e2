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

//! The transaction organizer (C6): the ingress point for unconfirmed
//! transactions, and the reorg-reconciliation hook the block organizer
//! calls into after every successful reorganization.

use std::sync::Arc;

use bcnode_chain::BlockOrganizer;
use bcnode_core::{
	Block, ChainLock, Clock, GlobalConfig, Hash, Hashed, Registry, Relayed, Resubscribe, ScriptVerifier,
	StopFlag, SubscriptionId, Transaction,
};
use bcnode_store::ChainStore;
use bcnode_util::Mutex;
use log::{debug, info};

use crate::entry::Handler;
use crate::error::{Error, ErrorKind};
use crate::pool::TransactionPool;
use crate::validator::TxValidator;

/// Payload delivered to transaction-accepted subscribers.
#[derive(Debug, Clone)]
pub struct TransactionEvent {
	pub hash: Hash,
	pub tx: Transaction,
}

/// The transaction organizer. Shares its [`ChainLock`] and [`StopFlag`]
/// with the block organizer so the readers-writer discipline in §5 holds.
pub struct TransactionOrganizer<S: ChainStore> {
	pool: Mutex<TransactionPool>,
	store: Arc<S>,
	chain_lock: ChainLock,
	script: Arc<dyn ScriptVerifier>,
	clock: Arc<dyn Clock>,
	accepted_registry: Registry<TransactionEvent>,
}

impl<S: ChainStore> TransactionOrganizer<S> {
	/// `config` supplies the pool's capacity (`max_pool_transactions`); it
	/// is read, never written, for the lifetime of the organizer.
	pub fn new(
		store: Arc<S>,
		chain_lock: ChainLock,
		stop: StopFlag,
		script: Arc<dyn ScriptVerifier>,
		clock: Arc<dyn Clock>,
		config: &GlobalConfig,
	) -> TransactionOrganizer<S> {
		TransactionOrganizer {
			pool: Mutex::new(TransactionPool::new(config.max_pool_transactions, stop)),
			store,
			chain_lock,
			script,
			clock,
			accepted_registry: Registry::new(),
		}
	}

	/// Registers a transaction-accepted handler. See [`Registry::subscribe`].
	pub fn subscribe_transaction<F>(&self, handler: F) -> SubscriptionId
	where
		F: FnMut(Relayed<'_, TransactionEvent>) -> Resubscribe + Send + 'static,
	{
		self.accepted_registry.subscribe(handler)
	}

	/// Number of unconfirmed transactions currently pooled.
	pub fn pool_len(&self) -> usize {
		self.pool.lock().len()
	}

	/// Up to `max` pooled transaction hashes, oldest first.
	pub fn fetch_inventory(&self, max: usize) -> Vec<Hash> {
		self.pool.lock().fetch_inventory(max)
	}

	/// Validates `tx` and, on success, pools it under `completion`.
	/// `completion` fires exactly once: immediately on rejection, or later
	/// when the pooled entry is confirmed, evicted, or superseded.
	pub fn organize(&self, tx: Transaction, completion: Handler) {
		let _guard = self.chain_lock.read();

		let validator = TxValidator { script: self.script.as_ref(), clock: self.clock.as_ref() };
		if let Err(e) = validator.check(&tx) {
			completion(Err(e));
			return;
		}

		let tip_height = match self.store.get_tip_height() {
			Ok(height) => height,
			Err(e) => {
				completion(Err(Error::from(e)));
				return;
			}
		};
		let next_height = tip_height.map(|h| h + 1).unwrap_or(0);

		if let Err(e) = validator.accept(&tx, next_height) {
			completion(Err(e));
			return;
		}

		let hash = tx.hash();
		let mut pool = self.pool.lock();
		if pool.contains(&hash) {
			drop(pool);
			completion(Err(ErrorKind::Duplicate.into()));
			return;
		}
		if let Err(e) = validator.connect(&tx, self.store.as_ref(), &pool, next_height) {
			drop(pool);
			completion(Err(e));
			return;
		}

		let event = TransactionEvent { hash, tx: tx.clone() };
		pool.add(tx, completion);
		drop(pool);
		debug!("organize: transaction {:?} entered the pool", hash);
		self.accepted_registry.relay(&event);
	}

	/// Registers [`Self::reconcile`] as the block organizer's reorganize
	/// handler (§2: reorg completion reconciles the tx pool), so every
	/// successful reorganization reconciles this pool without the caller
	/// having to wire the two together by hand. `self` must be held in an
	/// `Arc` because the subscription keeps a clone alive for as long as
	/// it stays registered.
	pub fn subscribe_to_reorgs(self: &Arc<Self>, block_organizer: &BlockOrganizer<S>) -> SubscriptionId
	where
		S: 'static,
	{
		let organizer = self.clone();
		block_organizer.subscribe_reorganize(move |event| {
			if let Relayed::Event(event) = event {
				organizer.reconcile(&event.fork_blocks, &event.popped_blocks);
			}
			Resubscribe::Keep
		})
	}

	/// Reconciles the pool after a reorganization: drops entries confirmed
	/// by `new_blocks` (reporting success) and entries that conflict with
	/// a spend now confirmed (reporting double-spend), then re-offers
	/// `popped_blocks`' own transactions back through `organize` so any
	/// that are still valid against the new tip are re-pooled.
	pub fn reconcile(&self, new_blocks: &[Block], popped_blocks: &[Block]) {
		self.pool.lock().delete_superseded(new_blocks);

		for block in popped_blocks {
			for tx in &block.transactions {
				if tx.is_coinbase() {
					continue;
				}
				self.organize(tx.clone(), Box::new(|_| {}));
			}
		}
		info!(
			"reconcile: {} new block(s) confirmed, {} popped block(s) replayed",
			new_blocks.len(),
			popped_blocks.len()
		);
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use bcnode_core::{
		hash::ZERO_HASH, BlockHeader, CompactTarget, FixedClock, OutPoint, ScriptFlags, TxIn, TxOut,
	};
	use bcnode_store::MemoryChainStore;

	use super::*;

	struct AlwaysValidScript;
	impl ScriptVerifier for AlwaysValidScript {
		fn verify(&self, _prev: &TxOut, _input: &TxIn, _flags: ScriptFlags) -> Result<(), String> {
			Ok(())
		}
	}

	struct AlwaysValidPow;
	impl bcnode_core::PowVerifier for AlwaysValidPow {
		fn verify(&self, _header: &BlockHeader) -> bool {
			true
		}
	}

	/// A coinbase transaction with a single output of `value`, distinct
	/// per `height`/`seed` so successive filler blocks hash differently.
	fn coinbase(height: u64, seed: u8, value: u64) -> Transaction {
		Transaction {
			version: 1,
			inputs: vec![TxIn {
				previous_output: OutPoint::null(),
				script_sig: vec![seed, (height & 0xff) as u8, (height >> 8) as u8],
				sequence: bcnode_core::transaction::SEQUENCE_FINAL,
			}],
			outputs: vec![TxOut { value, script_pubkey: vec![] }],
			lock_time: 0,
		}
	}

	fn filler_block(height: u64, seed: u8) -> Block {
		Block {
			header: BlockHeader {
				version: 1,
				prev_hash: ZERO_HASH,
				merkle_root: ZERO_HASH,
				timestamp: 1_600_000_000 + height as u32,
				bits: CompactTarget(0x207fffff),
				nonce: seed as u32,
			},
			transactions: vec![coinbase(height, seed, 50 * 100_000_000)],
		}
	}

	/// Builds a store whose genesis coinbase is matured: genesis at
	/// height 0, then `COINBASE_MATURITY` filler blocks pushed directly
	/// (the in-memory store only checks sequential height, so these need
	/// not be individually valid — the same shortcut the block organizer's
	/// own tests take for a bare genesis).
	fn matured_store() -> (Arc<MemoryChainStore>, Transaction) {
		let store = Arc::new(MemoryChainStore::new());
		let genesis_coinbase = coinbase(0, 0, 50 * 100_000_000);
		let genesis = Block {
			header: BlockHeader {
				version: 1,
				prev_hash: ZERO_HASH,
				merkle_root: ZERO_HASH,
				timestamp: 1_600_000_000,
				bits: CompactTarget(0x207fffff),
				nonce: 0,
			},
			transactions: vec![genesis_coinbase.clone()],
		};
		store.push(genesis, 0).unwrap();
		for height in 1..=bcnode_core::consensus::COINBASE_MATURITY {
			store.push(filler_block(height, 1), height).unwrap();
		}
		(store, genesis_coinbase)
	}

	fn organizer(store: Arc<MemoryChainStore>) -> TransactionOrganizer<MemoryChainStore> {
		TransactionOrganizer::new(
			store,
			ChainLock::new(),
			StopFlag::new(),
			Arc::new(AlwaysValidScript),
			Arc::new(FixedClock::new(1_700_000_000)),
			&GlobalConfig { max_pool_transactions: 10, ..GlobalConfig::regtest() },
		)
	}

	fn spend(outpoint: OutPoint, value: u64, seed: u8) -> Transaction {
		Transaction {
			version: 1,
			inputs: vec![TxIn {
				previous_output: outpoint,
				script_sig: vec![seed],
				sequence: bcnode_core::transaction::SEQUENCE_FINAL,
			}],
			outputs: vec![TxOut { value, script_pubkey: vec![] }],
			lock_time: 0,
		}
	}

	type Log = Arc<Mutex<Vec<bool>>>;

	fn recording_handler(log: Log) -> Handler {
		Box::new(move |result| log.lock().unwrap().push(result.is_ok()))
	}

	#[test]
	fn spend_of_matured_coinbase_is_pooled_and_relayed() {
		let (store, genesis_coinbase) = matured_store();
		let organizer = organizer(store);

		let relayed: Arc<Mutex<Vec<Hash>>> = Arc::new(Mutex::new(Vec::new()));
		let relayed_clone = relayed.clone();
		organizer.subscribe_transaction(move |event| {
			relayed_clone.lock().unwrap().push(event.hash);
			Resubscribe::Keep
		});

		let outpoint = OutPoint::new(genesis_coinbase.hash(), 0);
		let tx = spend(outpoint, 49 * 100_000_000, 1);
		let tx_hash = tx.hash();

		let log: Log = Arc::new(Mutex::new(Vec::new()));
		organizer.organize(tx, recording_handler(log.clone()));

		assert_eq!(organizer.pool_len(), 1);
		assert!(log.lock().unwrap().is_empty(), "handler only fires on confirm/evict/supersede");
		assert_eq!(relayed.lock().unwrap().as_slice(), &[tx_hash]);
	}

	#[test]
	fn spend_of_immature_coinbase_is_rejected() {
		let store = Arc::new(MemoryChainStore::new());
		let genesis_coinbase = coinbase(0, 0, 50 * 100_000_000);
		let genesis = Block {
			header: BlockHeader {
				version: 1,
				prev_hash: ZERO_HASH,
				merkle_root: ZERO_HASH,
				timestamp: 1_600_000_000,
				bits: CompactTarget(0x207fffff),
				nonce: 0,
			},
			transactions: vec![genesis_coinbase.clone()],
		};
		store.push(genesis, 0).unwrap();
		let organizer = organizer(store);

		let outpoint = OutPoint::new(genesis_coinbase.hash(), 0);
		let tx = spend(outpoint, 49 * 100_000_000, 1);
		let log: Log = Arc::new(Mutex::new(Vec::new()));
		organizer.organize(tx, recording_handler(log.clone()));

		assert_eq!(organizer.pool_len(), 0);
		assert_eq!(log.lock().unwrap().as_slice(), &[false]);
	}

	#[test]
	fn second_spend_of_same_output_is_a_double_spend() {
		let (store, genesis_coinbase) = matured_store();
		let organizer = organizer(store);
		let outpoint = OutPoint::new(genesis_coinbase.hash(), 0);

		let first = spend(outpoint, 49 * 100_000_000, 1);
		let log1: Log = Arc::new(Mutex::new(Vec::new()));
		organizer.organize(first, recording_handler(log1.clone()));
		assert_eq!(organizer.pool_len(), 1);

		let second = spend(outpoint, 48 * 100_000_000, 2);
		let log2: Log = Arc::new(Mutex::new(Vec::new()));
		organizer.organize(second, recording_handler(log2.clone()));

		assert_eq!(organizer.pool_len(), 1, "the conflicting spend must not be pooled");
		assert_eq!(log2.lock().unwrap().as_slice(), &[false]);
	}

	#[test]
	fn reconcile_confirms_pooled_tx_and_drops_conflicts_from_reorg() {
		let (store, genesis_coinbase) = matured_store();
		let organizer = organizer(store);
		let outpoint = OutPoint::new(genesis_coinbase.hash(), 0);

		let winner = spend(outpoint, 49 * 100_000_000, 1);
		let winner_hash = winner.hash();
		let log: Log = Arc::new(Mutex::new(Vec::new()));
		organizer.organize(winner.clone(), recording_handler(log.clone()));
		assert_eq!(organizer.pool_len(), 1);

		// The confirmed chain ends up containing `winner` itself (the
		// common "our own pooled transaction got mined" case).
		let confirming_block = Block {
			header: BlockHeader {
				version: 1,
				prev_hash: ZERO_HASH,
				merkle_root: ZERO_HASH,
				timestamp: 1_700_000_100,
				bits: CompactTarget(0x207fffff),
				nonce: 0,
			},
			transactions: vec![coinbase(101, 9, 50 * 100_000_000), winner],
		};
		organizer.reconcile(std::slice::from_ref(&confirming_block), &[]);

		assert_eq!(organizer.pool_len(), 0);
		assert_eq!(log.lock().unwrap().as_slice(), &[true]);
		let _ = winner_hash;
	}

	#[test]
	fn reorg_subscription_reconciles_the_pool_without_a_manual_call() {
		let (store, genesis_coinbase) = matured_store();
		let chain_lock = ChainLock::new();
		let stop = StopFlag::new();
		let clock = Arc::new(FixedClock::new(1_700_000_000));

		let tx_organizer = Arc::new(TransactionOrganizer::new(
			store.clone(),
			chain_lock.clone(),
			stop.clone(),
			Arc::new(AlwaysValidScript),
			clock.clone(),
			&GlobalConfig { max_pool_transactions: 10, ..GlobalConfig::regtest() },
		));
		let block_organizer = bcnode_chain::BlockOrganizer::new(
			store.clone(),
			chain_lock,
			stop,
			Arc::new(AlwaysValidPow),
			Arc::new(AlwaysValidScript),
			clock,
			GlobalConfig { max_pool_blocks: 100, ..GlobalConfig::regtest() },
			Arc::new(bcnode_chain::InlineExecutor),
			Arc::new(bcnode_chain::InlineExecutor),
		);
		tx_organizer.subscribe_to_reorgs(&block_organizer);

		let outpoint = OutPoint::new(genesis_coinbase.hash(), 0);
		let winner = spend(outpoint, 49 * 100_000_000, 1);
		let log: Log = Arc::new(Mutex::new(Vec::new()));
		tx_organizer.organize(winner.clone(), recording_handler(log.clone()));
		assert_eq!(tx_organizer.pool_len(), 1);

		let last_filler_hash = filler_block(bcnode_core::consensus::COINBASE_MATURITY, 1).hash();
		let confirming_height = bcnode_core::consensus::COINBASE_MATURITY + 1;
		let confirming_txs =
			vec![coinbase(confirming_height, 9, bcnode_core::global::subsidy(confirming_height)), winner];
		let merkle =
			bcnode_core::merkle::merkle_root(&confirming_txs.iter().map(Hashed::hash).collect::<Vec<_>>());
		let confirming_block = Block {
			header: BlockHeader {
				version: 1,
				prev_hash: last_filler_hash,
				merkle_root: merkle,
				timestamp: 1_700_000_101,
				bits: CompactTarget(0x207fffff),
				nonce: 0,
			},
			transactions: confirming_txs,
		};

		// Organizing the confirming block through the real block organizer
		// fires a reorganize event; the subscription registered above must
		// reconcile the pool on its own, with no direct call to
		// `reconcile` anywhere in this test.
		block_organizer.organize(confirming_block).unwrap();

		assert_eq!(tx_organizer.pool_len(), 0);
		assert_eq!(log.lock().unwrap().as_slice(), &[true]);
	}
}
