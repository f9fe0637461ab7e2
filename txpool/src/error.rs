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

//! Error types for the transaction pool and transaction organizer.

use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

/// Error definition, following the same shape as the chain crate's.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Transaction-side failure kinds (§4.6, §7).
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// check(): a coinbase transaction was submitted directly.
	#[fail(display = "Coinbase transactions are not relayed")]
	UnexpectedCoinbase,
	/// check(): no inputs, no outputs, or a repeated input within the tx.
	#[fail(display = "Transaction is malformed")]
	MalformedTransaction,
	/// check(): serialized size exceeds the standard bound.
	#[fail(display = "Transaction exceeds maximum standard size")]
	OversizedTransaction,
	/// accept(): not final at the pool's next-block height/time.
	#[fail(display = "Transaction is not final")]
	NonFinalTransaction,
	/// connect(): a referenced previous output could not be resolved.
	#[fail(display = "Input references an unknown output")]
	InputMissing,
	/// connect(): an input spends a coinbase output before maturity.
	#[fail(display = "Input spends an immature coinbase output")]
	ImmatureSpend,
	/// connect(): an input conflicts with the confirmed chain or the pool.
	#[fail(display = "Double spend")]
	DoubleSpend,
	/// connect(): outputs exceed inputs, or total exceeds the money range.
	#[fail(display = "Transaction amounts are invalid")]
	BadAmount,
	/// connect(): fee rate falls below the minimum relay rate.
	#[fail(display = "Transaction fee rate is below the minimum relay rate")]
	FeeTooLow,
	/// connect(): script execution rejected an input.
	#[fail(display = "Script verification failed: {}", _0)]
	ScriptFailure(String),
	/// The transaction's hash is already pooled.
	#[fail(display = "Duplicate transaction")]
	Duplicate,
	/// The pool is at capacity and this entry lost eviction priority.
	#[fail(display = "Transaction pool is full")]
	PoolFilled,
	/// A cancellation was requested mid-operation.
	#[fail(display = "Service stopped")]
	ServiceStopped,
	/// The store (or another collaborator) failed in a way unrelated to the
	/// transaction's validity.
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

	/// Whether this error is the transaction's own fault: a structural or
	/// consensus-rule violation, as opposed to a transient or capacity-
	/// driven outcome.
	pub fn is_bad_data(&self) -> bool {
		!matches!(
			self.kind(),
			ErrorKind::Duplicate | ErrorKind::PoolFilled | ErrorKind::ServiceStopped | ErrorKind::OperationFailed(_)
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
