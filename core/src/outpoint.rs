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

//! Outpoints: the (transaction hash, output index) pair identifying a
//! specific previously-created output.

use serde::{Deserialize, Serialize};

use crate::hash::{Hash, ZERO_HASH};

/// Identifies a single transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
	/// Hash of the transaction that created the output.
	pub tx_hash: Hash,
	/// Index of the output within that transaction.
	pub index: u32,
}

impl OutPoint {
	/// Builds an outpoint.
	pub fn new(tx_hash: Hash, index: u32) -> OutPoint {
		OutPoint { tx_hash, index }
	}

	/// The synthetic null outpoint used by a coinbase input: all-zero hash,
	/// max index.
	pub fn null() -> OutPoint {
		OutPoint {
			tx_hash: ZERO_HASH,
			index: u32::MAX,
		}
	}

	/// Whether this is the coinbase's synthetic null outpoint.
	pub fn is_null(&self) -> bool {
		self.tx_hash == ZERO_HASH && self.index == u32::MAX
	}
}
