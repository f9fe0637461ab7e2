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

//! Error types for the block pool, validator and organizer.

use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

/// Error definition.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Chain-side failure kinds (§4.3, §7). Each structural/PoW/rule kind
/// corresponds to one of §4.3's named validator failure kinds; the
/// `duplicate`/`orphan`/`insufficient_work` policy kinds and the two
/// transient kinds close out the organizer's outcome set from §6.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// check(): serialized size exceeds the consensus bound.
	#[fail(display = "Block exceeds maximum size")]
	OversizedBlock,
	/// check(): computed merkle root does not match the header's.
	#[fail(display = "Merkle root mismatch")]
	MerkleMismatch,
	/// check(): header hash does not satisfy its declared target.
	#[fail(display = "Proof of work does not satisfy declared target")]
	InvalidPow,
	/// check(): first transaction is not a coinbase, or a later one is.
	#[fail(display = "Coinbase position or shape is invalid")]
	InvalidCoinbasePosition,
	/// check(): two transactions in the block share a hash.
	#[fail(display = "Duplicate transaction within block")]
	DuplicateTransaction,
	/// check(): signature operation count exceeds the consensus bound.
	#[fail(display = "Block exceeds maximum signature operation count")]
	TooManySigops,
	/// accept(): `bits` does not match the recomputed expected target.
	#[fail(display = "Incorrect proof-of-work target")]
	BadDifficultyBits,
	/// accept(): timestamp is not after the median of the past 11 blocks.
	#[fail(display = "Block timestamp is not after median-time-past")]
	TimestampTooOld,
	/// accept(): timestamp is too far ahead of adjusted network time.
	#[fail(display = "Block timestamp too far in the future")]
	TimestampTooNew,
	/// accept(): block version is below the currently enforced minimum.
	#[fail(display = "Block version {} is no longer accepted", _0)]
	ObsoleteVersion(i32),
	/// accept(): BIP34 coinbase height does not match the block's height.
	#[fail(display = "Coinbase does not commit to block height")]
	BadCoinbaseHeight,
	/// accept()/connect(): a transaction is not yet final at this height/time.
	#[fail(display = "Transaction is not final")]
	NonFinalTransaction,
	/// connect(): a referenced previous output could not be resolved.
	#[fail(display = "Input references an unknown output")]
	InputMissing,
	/// connect(): a coinbase output is spent before reaching maturity.
	#[fail(display = "Input spends an immature coinbase output")]
	ImmatureSpend,
	/// connect(): an input spends an already-spent output.
	#[fail(display = "Double spend")]
	DoubleSpend,
	/// connect(): outputs exceed inputs, or total exceeds the money range.
	#[fail(display = "Transaction amounts are invalid")]
	BadAmount,
	/// connect(): coinbase claims more than subsidy plus fees.
	#[fail(display = "Coinbase pays out more than subsidy plus fees")]
	BadCoinbaseAmount,
	/// connect(): script execution rejected an input.
	#[fail(display = "Script verification failed: {}", _0)]
	ScriptFailure(String),
	/// The block's hash is already known (in the pool or the confirmed chain).
	#[fail(display = "Duplicate block")]
	Duplicate,
	/// The block's parent is not the confirmed chain nor any pooled candidate.
	#[fail(display = "Orphan block")]
	Orphan,
	/// The fork's cumulative difficulty does not exceed the current chain's.
	#[fail(display = "Insufficient cumulative work for reorganization")]
	InsufficientWork,
	/// A cancellation was requested mid-operation.
	#[fail(display = "Service stopped")]
	ServiceStopped,
	/// The store (or another collaborator) failed in a way unrelated to the
	/// block's validity.
	#[fail(display = "Operation failed: {}", _0)]
	OperationFailed(String),
}

impl Error {
	/// The error's kind.
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}

	/// The immediate cause, if any.
	pub fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	/// The backtrace captured when this error was first created.
	pub fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}

	/// Whether this error is the block's own fault: a structural or
	/// consensus-rule violation that should evict it (and its descendants)
	/// from the pool, as opposed to a transient or policy outcome that
	/// leaves the pool untouched.
	pub fn is_bad_data(&self) -> bool {
		!matches!(
			self.kind(),
			ErrorKind::Duplicate
				| ErrorKind::Orphan
				| ErrorKind::InsufficientWork
				| ErrorKind::ServiceStopped
				| ErrorKind::OperationFailed(_)
		)
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error { inner: Context::new(kind) }
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}

impl From<bcnode_store::Error> for Error {
	fn from(error: bcnode_store::Error) -> Error {
		let message = error.to_string();
		Error { inner: error.context(ErrorKind::OperationFailed(message)) }
	}
}
