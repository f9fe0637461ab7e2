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

//! The compact "bits" encoding of a proof-of-work target, and the
//! cumulative `Difficulty` a fork or chain segment accrues.

use std::fmt;
use std::ops::Add;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::consensus;

/// The maximum target permitted on mainnet (difficulty 1).
pub const MAX_TARGET: [u8; 32] = [
	0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
	0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// A compact 32-bit encoding of a 256-bit big-integer proof-of-work
/// threshold, exactly as carried in a block header's `bits` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactTarget(pub u32);

impl CompactTarget {
	/// Decodes the compact form into the full 256-bit target.
	pub fn to_biguint(self) -> BigUint {
		let bits = self.0;
		let exponent = (bits >> 24) as usize;
		let mantissa = bits & 0x007f_ffff;
		let negative = bits & 0x0080_0000 != 0;

		if negative || mantissa == 0 {
			return BigUint::zero();
		}

		if exponent <= 3 {
			BigUint::from(mantissa >> (8 * (3 - exponent)))
		} else {
			BigUint::from(mantissa) << (8 * (exponent - 3))
		}
	}

	/// Encodes a 256-bit target back into compact form, per Bitcoin's
	/// "nBits" encoding (sign bit, then base-256 floating point).
	pub fn from_biguint(target: &BigUint) -> CompactTarget {
		let mut bytes = target.to_bytes_be();
		if bytes.is_empty() {
			return CompactTarget(0);
		}
		// A leading byte with the high bit set would be read back as
		// negative; prefix a zero byte in that case.
		if bytes[0] & 0x80 != 0 {
			bytes.insert(0, 0);
		}

		let mut exponent = bytes.len() as u32;
		let mantissa = if bytes.len() >= 3 {
			((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32)
		} else {
			let mut padded = bytes.clone();
			padded.resize(3, 0);
			((padded[0] as u32) << 16) | ((padded[1] as u32) << 8) | (padded[2] as u32)
		};

		if bytes.len() < 3 {
			exponent = bytes.len() as u32;
		}

		CompactTarget((exponent << 24) | mantissa)
	}

	/// Clamps an arbitrary target to the network maximum.
	pub fn capped(target: BigUint, max_target: &BigUint) -> CompactTarget {
		let capped = if &target > max_target {
			max_target.clone()
		} else {
			target
		};
		CompactTarget::from_biguint(&capped)
	}
}

impl fmt::Display for CompactTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#010x}", self.0)
	}
}

/// Cumulative proof-of-work, the sum over a range of blocks of
/// `max_target / target`. Large enough that it must be a big-integer, not
/// a machine word, once a chain has run for any length of time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Difficulty {
	num: BigUint,
}

impl Difficulty {
	/// The zero difficulty, identity element for `+`.
	pub fn zero() -> Difficulty {
		Difficulty { num: BigUint::zero() }
	}

	/// Difficulty of one: a block hashed right at the maximum target.
	pub fn one() -> Difficulty {
		Difficulty { num: BigUint::from(1u32) }
	}

	/// The difficulty represented by a compact target: `max_target / target`.
	pub fn from_target(target: CompactTarget) -> Difficulty {
		let max = BigUint::from_bytes_be(&MAX_TARGET);
		let t = target.to_biguint();
		if t.is_zero() {
			return Difficulty::zero();
		}
		Difficulty { num: max / t }
	}

	/// Raw big-integer value, for tests and display.
	pub fn to_biguint(&self) -> BigUint {
		self.num.clone()
	}
}

impl Add for Difficulty {
	type Output = Difficulty;
	fn add(self, rhs: Difficulty) -> Difficulty {
		Difficulty { num: self.num + rhs.num }
	}
}

impl<'a> Add<&'a Difficulty> for Difficulty {
	type Output = Difficulty;
	fn add(self, rhs: &'a Difficulty) -> Difficulty {
		Difficulty { num: self.num + &rhs.num }
	}
}

impl std::iter::Sum for Difficulty {
	fn sum<I: Iterator<Item = Difficulty>>(iter: I) -> Difficulty {
		iter.fold(Difficulty::zero(), |acc, d| acc + d)
	}
}

impl fmt::Display for Difficulty {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.num)
	}
}

/// Recomputes the target at a retarget boundary, per §4.3's target
/// recomputation rule: clamp the observed timespan to [target_timespan/4,
/// target_timespan*4], scale the previous target by the clamped ratio, and
/// cap at the network maximum.
///
/// `actual_timespan` is `timestamp(H-1) - timestamp(H-2016)`, in seconds.
pub fn retarget(prev_target: CompactTarget, actual_timespan: i64, max_target: &BigUint) -> CompactTarget {
	let min_timespan = consensus::TARGET_TIMESPAN as i64 / consensus::RETARGETING_FACTOR as i64;
	let max_timespan = consensus::TARGET_TIMESPAN as i64 * consensus::RETARGETING_FACTOR as i64;
	let clamped = actual_timespan.clamp(min_timespan, max_timespan) as u64;

	let prev = prev_target.to_biguint();
	let new_target = (prev * BigUint::from(clamped)) / BigUint::from(consensus::TARGET_TIMESPAN);

	CompactTarget::capped(new_target, max_target)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compact_round_trip_matches_bitcoin_genesis() {
		// 0x1d00ffff is the canonical mainnet genesis bits; its expansion and
		// re-encoding must be exact.
		let bits = CompactTarget(0x1d00ffff);
		let expanded = bits.to_biguint();
		let re_encoded = CompactTarget::from_biguint(&expanded);
		assert_eq!(bits.0, re_encoded.0);
	}

	#[test]
	fn difficulty_one_is_max_target_over_itself() {
		let max = CompactTarget::from_biguint(&BigUint::from_bytes_be(&MAX_TARGET));
		assert_eq!(Difficulty::from_target(max), Difficulty::one());
	}

	#[test]
	fn retarget_is_deterministic_for_fixed_inputs() {
		let max = BigUint::from_bytes_be(&MAX_TARGET);
		let prev = CompactTarget(0x1d00ffff);
		let a = retarget(prev, consensus::TARGET_TIMESPAN as i64, &max);
		let b = retarget(prev, consensus::TARGET_TIMESPAN as i64, &max);
		assert_eq!(a.0, b.0);
	}

	#[test]
	fn retarget_clamps_extreme_timespans() {
		let max = BigUint::from_bytes_be(&MAX_TARGET);
		let prev = CompactTarget(0x1d00ffff);
		// An absurdly fast actual_timespan clamps to timespan/4.
		let fast = retarget(prev, 1, &max);
		let clamp_floor = retarget(prev, consensus::TARGET_TIMESPAN as i64 / 4, &max);
		assert_eq!(fast.0, clamp_floor.0);
	}

	#[test]
	fn difficulty_sum_is_additive() {
		let d1 = Difficulty::from_target(CompactTarget(0x1d00ffff));
		let d2 = d1.clone();
		let sum: Difficulty = vec![d1.clone(), d2].into_iter().sum();
		assert_eq!(sum, d1.clone() + d1);
	}
}
