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

//! The process-wide chain lock (§5, §9): the block organizer holds it
//! exclusively for the whole duration of one `organize_block` call; the
//! transaction organizer holds it in shared mode, excluding only those
//! block-organize critical sections. Named and shared rather than private
//! to either organizer, since both need the same readers-writer discipline
//! over the one confirmed chain.

use std::sync::Arc;

use bcnode_util::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The shared chain lock. Cheap to clone (an `Arc` underneath); the same
/// instance must be handed to both the block organizer and the
/// transaction organizer for the discipline in §5 to hold.
#[derive(Clone, Default)]
pub struct ChainLock(Arc<RwLock<()>>);

impl ChainLock {
	/// Builds a fresh, unlocked chain lock.
	pub fn new() -> ChainLock {
		ChainLock(Arc::new(RwLock::new(())))
	}

	/// Acquires shared access: used by the transaction organizer, which
	/// only needs to exclude concurrent reorgs, not other transactions.
	pub fn read(&self) -> RwLockReadGuard<'_, ()> {
		self.0.read()
	}

	/// Acquires exclusive access: held by the block organizer for the
	/// entire `organize_block` call.
	pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
		self.0.write()
	}
}
