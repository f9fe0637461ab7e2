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

//! Binary merkle tree root over transaction hashes, Bitcoin-style
//! (duplicate the last element of an odd-length level rather than carry it
//! up unpaired).

use crate::hash::{double_sha256, Hash};

/// Computes the merkle root of an ordered list of leaf hashes. Returns the
/// zero hash for an empty list (never valid for a real block, but keeps
/// this a total function).
pub fn merkle_root(leaves: &[Hash]) -> Hash {
	if leaves.is_empty() {
		return crate::hash::ZERO_HASH;
	}
	let mut level: Vec<Hash> = leaves.to_vec();
	while level.len() > 1 {
		if level.len() % 2 == 1 {
			level.push(*level.last().unwrap());
		}
		level = level
			.chunks(2)
			.map(|pair| {
				let mut buf = Vec::with_capacity(64);
				buf.extend_from_slice(pair[0].as_bytes());
				buf.extend_from_slice(pair[1].as_bytes());
				double_sha256(&buf)
			})
			.collect();
	}
	level[0]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_leaf_is_its_own_root() {
		let h = double_sha256(b"leaf");
		assert_eq!(merkle_root(&[h]), h);
	}

	#[test]
	fn odd_count_duplicates_last_leaf() {
		let a = double_sha256(b"a");
		let b = double_sha256(b"b");
		let c = double_sha256(b"c");
		let with_dup = merkle_root(&[a, b, c, c]);
		let odd = merkle_root(&[a, b, c]);
		assert_eq!(with_dup, odd);
	}
}
