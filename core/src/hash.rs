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

//! 256-bit hash identifiers used throughout the workspace: block hashes,
//! transaction hashes and the hash half of an outpoint all share this type.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A fixed-size hash, displayed and (de)serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

/// The all-zero hash, used as the "no previous transaction" marker in a
/// coinbase input.
pub const ZERO_HASH: Hash = Hash([0u8; 32]);

impl Hash {
	/// Raw bytes, big-endian as stored (not reversed for display).
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}
}

impl fmt::Debug for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", hex::encode(self.0))
	}
}

impl fmt::Display for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", hex::encode(self.0))
	}
}

/// Double-SHA256, the hash function consensus uses for block and
/// transaction identifiers.
pub fn double_sha256(data: &[u8]) -> Hash {
	let first = Sha256::digest(data);
	let second = Sha256::digest(&first);
	let mut out = [0u8; 32];
	out.copy_from_slice(&second);
	Hash(out)
}

/// Implemented by anything that has a canonical, serializable identity.
pub trait Hashed {
	/// Computes the hash identifying this value.
	fn hash(&self) -> Hash;
}
