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

//! The adjusted-network-time source consumed by the validator's timestamp
//! checks. Injected so tests can pin "now" instead of racing the wall
//! clock.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies adjusted network time, in seconds since the Unix epoch.
pub trait Clock: Send + Sync {
	/// Current adjusted network time.
	fn adjusted_time(&self) -> i64;
}

/// Wraps the system wall clock. "Adjusted" in name only here — real
/// network time adjustment (peer offset median) lives in the networking
/// layer, out of scope per §1.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn adjusted_time(&self) -> i64 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.expect("system clock is before the Unix epoch")
			.as_secs() as i64
	}
}

/// A clock tests can set to an arbitrary instant and advance deterministically.
#[derive(Debug)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
	/// Builds a fixed clock starting at `now`.
	pub fn new(now: i64) -> FixedClock {
		FixedClock(AtomicI64::new(now))
	}

	/// Moves the clock forward (or backward) by `delta` seconds.
	pub fn advance(&self, delta: i64) {
		self.0.fetch_add(delta, Ordering::SeqCst);
	}

	/// Pins the clock to an absolute value.
	pub fn set(&self, now: i64) {
		self.0.store(now, Ordering::SeqCst);
	}
}

impl Clock for FixedClock {
	fn adjusted_time(&self) -> i64 {
		self.0.load(Ordering::SeqCst)
	}
}
