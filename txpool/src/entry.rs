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

//! A single pool entry and the outcome its handler eventually fires with.

use bcnode_core::{Hash, Hashed, Transaction};

use crate::error::{Error, ErrorKind};

/// The one-shot completion callback handed to `organize`/`add`. Fires
/// exactly once over the entry's lifetime, whether immediately (rejected
/// before ever pooling) or later, when the pooled entry is confirmed,
/// evicted, or superseded.
pub type Handler = Box<dyn FnOnce(Result<(), Error>) + Send>;

/// The result a pool entry's handler eventually fires with. A small enum
/// rather than a bare `Result` so batch removals can report the same
/// outcome to many entries without requiring `Error` itself to be
/// `Clone` (its backtrace is not).
#[derive(Clone, Debug)]
pub enum Outcome {
	/// The transaction was confirmed in a block.
	Success,
	/// The transaction left the pool for the given reason.
	Failure(ErrorKind),
}

impl Outcome {
	pub fn into_result(self) -> Result<(), Error> {
		match self {
			Outcome::Success => Ok(()),
			Outcome::Failure(kind) => Err(kind.into()),
		}
	}
}

/// A pooled, not-yet-confirmed transaction (§3 "Transaction Entry").
pub struct TransactionEntry {
	pub hash: Hash,
	pub tx: Transaction,
	handler: Option<Handler>,
}

impl TransactionEntry {
	pub fn new(tx: Transaction, handler: Handler) -> TransactionEntry {
		let hash = tx.hash();
		TransactionEntry { hash, tx, handler: Some(handler) }
	}

	/// Invokes the handler with `outcome`, consuming the entry. A no-op if
	/// the handler was already taken (never happens in normal use; guards
	/// against a future refactor accidentally firing twice).
	pub fn fire(mut self, outcome: Outcome) {
		if let Some(handler) = self.handler.take() {
			handler(outcome.into_result());
		}
	}
}
