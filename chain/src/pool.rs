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

//! The block pool (C1) and fork tracer (C2): an in-memory index of
//! candidate blocks not yet part of the confirmed chain, keyed by hash
//! with parent/child links kept as hashes rather than owning references
//! (§9 "Parent/child pool graph").

use std::collections::{HashMap, HashSet, VecDeque};

use bcnode_core::target::Difficulty;
use bcnode_core::{Block, Hash, Hashed};

/// One candidate block held by the pool.
pub struct BlockEntry {
	/// The owned block payload.
	pub block: Block,
	/// Parent block hash (may or may not itself be in the pool).
	pub parent: Hash,
	/// Hashes of pooled blocks whose `parent` is this entry's hash.
	pub children: HashSet<Hash>,
	/// Set once the organizer has run `accept`+`connect` successfully for
	/// this entry in some prior (possibly aborted) fork walk, so a later
	/// organize of a sibling or descendant doesn't redo the work.
	pub verified: bool,
}

/// In-memory index of not-yet-confirmed candidate blocks.
#[derive(Default)]
pub struct BlockPool {
	entries: HashMap<Hash, BlockEntry>,
	/// Insertion order of pool roots (entries whose parent is not itself
	/// pooled), oldest first — used only to bound total pool size.
	insertion_order: VecDeque<Hash>,
	capacity: usize,
}

/// The result of walking backward from a candidate tip: the contiguous
/// chain of pooled ancestors (oldest first, ending at the requested tip)
/// and the hash of the first ancestor not itself in the pool. That hash
/// is either a confirmed-chain block (bridging the fork to the store) or
/// a genuinely unknown ancestor (an orphan) — the organizer, which alone
/// can see the store, decides which.
pub struct TracedChain {
	/// Hash of the first ancestor not present in the pool.
	pub root_parent: Hash,
	/// Pooled ancestors, oldest first, with `tip` as the last element.
	pub blocks: Vec<Hash>,
}

impl BlockPool {
	/// Builds an empty pool with no size bound.
	pub fn new() -> BlockPool {
		BlockPool { entries: HashMap::new(), insertion_order: VecDeque::new(), capacity: usize::MAX }
	}

	/// Builds an empty pool that evicts its oldest root subtree once more
	/// than `capacity` root chains are held.
	pub fn with_capacity(capacity: usize) -> BlockPool {
		BlockPool { entries: HashMap::new(), insertion_order: VecDeque::new(), capacity }
	}

	/// Number of entries currently pooled.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the pool holds no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Whether a block with this hash is already pooled.
	pub fn exists(&self, hash: &Hash) -> bool {
		self.entries.contains_key(hash)
	}

	/// Looks up a pooled entry by hash.
	pub fn get(&self, hash: &Hash) -> Option<&BlockEntry> {
		self.entries.get(hash)
	}

	/// Marks a pooled entry as verified (accept+connect already succeeded
	/// for it during some organize call).
	pub fn mark_verified(&mut self, hash: &Hash) {
		if let Some(entry) = self.entries.get_mut(hash) {
			entry.verified = true;
		}
	}

	/// Inserts a new candidate. Returns `false` if the hash is already
	/// pooled (the caller treats this as "duplicate"). Wires the entry
	/// into its parent's child-set when the parent is itself pooled, and
	/// the reverse: any already-pooled entry whose `parent` is this block
	/// (an orphan that arrived before it) becomes this entry's child, so a
	/// later bridge is discoverable regardless of arrival order.
	pub fn add(&mut self, block: Block) -> bool {
		let hash = block.hash();
		if self.entries.contains_key(&hash) {
			return false;
		}
		let parent = block.header.prev_hash;
		let is_root = !self.entries.contains_key(&parent);
		let children: HashSet<Hash> = self
			.entries
			.iter()
			.filter(|(_, entry)| entry.parent == hash)
			.map(|(child_hash, _)| *child_hash)
			.collect();
		self.entries.insert(hash, BlockEntry { block, parent, children, verified: false });
		if let Some(parent_entry) = self.entries.get_mut(&parent) {
			parent_entry.children.insert(hash);
		}
		if is_root {
			self.insertion_order.push_back(hash);
		}
		self.evict_if_over_capacity(hash);
		true
	}

	fn evict_if_over_capacity(&mut self, just_inserted: Hash) {
		while self.insertion_order.len() > self.capacity {
			let oldest = match self.insertion_order.front().copied() {
				Some(h) => h,
				None => break,
			};
			if oldest == just_inserted {
				// Never evict the entry that was just inserted; wait for
				// the next `add` to retry.
				break;
			}
			self.insertion_order.pop_front();
			self.remove(&oldest);
		}
	}

	/// Removes the entry at `hash` and, iteratively (never recursively, per
	/// §9 "Subtree removal"), every descendant. Unlinks the entry from its
	/// parent's child-set. Returns the removed blocks in no particular
	/// order.
	pub fn remove(&mut self, hash: &Hash) -> Vec<Block> {
		let mut removed = Vec::new();
		let mut worklist: VecDeque<Hash> = VecDeque::new();
		worklist.push_back(*hash);

		while let Some(next) = worklist.pop_front() {
			let entry = match self.entries.remove(&next) {
				Some(e) => e,
				None => continue,
			};
			if let Some(parent_entry) = self.entries.get_mut(&entry.parent) {
				parent_entry.children.remove(&next);
			}
			self.insertion_order.retain(|h| *h != next);
			worklist.extend(entry.children.iter().copied());
			removed.push(entry.block);
		}
		removed
	}

	/// Walks parent hashes backward from `tip` (which must already be
	/// pooled) collecting the linear chain of pooled ancestors, then
	/// extends forward from `tip` through any unambiguous single-child
	/// descendant chain — a pooled block whose own parent only became
	/// resolvable once `tip` was organized joins the same fork. Stops
	/// extending at the first fork with more than one child: per §4.2,
	/// sibling forks are discovered independently when each of their own
	/// tips is organized, not bridged through a common ancestor here.
	pub fn trace(&self, tip: &Hash) -> TracedChain {
		let mut blocks = Vec::new();
		let mut current = *tip;
		let root_parent = loop {
			match self.entries.get(&current) {
				Some(entry) => {
					blocks.push(current);
					current = entry.parent;
				}
				None => break current,
			}
		};
		blocks.reverse();

		let mut frontier = *tip;
		loop {
			let children = &self.entries.get(&frontier).expect("tip must be pooled").children;
			if children.len() != 1 {
				break;
			}
			let only_child = *children.iter().next().expect("len checked above");
			blocks.push(only_child);
			frontier = only_child;
		}

		TracedChain { root_parent, blocks }
	}
}

/// One block within a fork being organized, with its per-index verified
/// bit (§3 "Fork").
pub struct ForkEntry {
	pub hash: Hash,
	pub block: Block,
	pub verified: bool,
}

/// A contiguous candidate chain rooted at a confirmed-chain block,
/// allocated fresh for a single `organize` call and discarded afterward
/// (§9 "Fork as value, not global").
pub struct Fork {
	/// Hash of the confirmed-chain block this fork extends.
	pub parent_hash: Hash,
	/// Height of `parent_hash` on the confirmed chain.
	pub height: u64,
	/// Fork blocks, oldest first.
	pub entries: Vec<ForkEntry>,
}

impl Fork {
	/// Number of blocks in the fork.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the fork currently holds no blocks.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Height of the block at `index` within this fork.
	pub fn height_at(&self, index: usize) -> u64 {
		self.height + index as u64 + 1
	}

	/// Sum of the fork's blocks' proof-of-work, as cumulative difficulty.
	pub fn difficulty(&self) -> Difficulty {
		self.entries.iter().map(|e| Difficulty::from_target(e.block.header.bits)).sum()
	}

	/// Removes `entries[from..]` (invalid tail after a failed
	/// accept/connect at `from`), returning the removed hashes so the
	/// caller can evict them from the pool.
	pub fn truncate_from(&mut self, from: usize) -> Vec<Hash> {
		self.entries.drain(from..).map(|e| e.hash).collect()
	}
}
