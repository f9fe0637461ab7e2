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

//! The shared cancellation flag (§5, §9): a single atomic, checked at
//! every state-machine transition and polled by the validator so in-flight
//! script execution can bail out early instead of running to completion
//! after the node has been asked to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply-cloneable, shared stop signal.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
	/// Builds a fresh, un-set flag.
	pub fn new() -> StopFlag {
		StopFlag(Arc::new(AtomicBool::new(false)))
	}

	/// Requests a stop. Idempotent.
	pub fn stop(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	/// Whether a stop has been requested.
	pub fn is_stopped(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}
