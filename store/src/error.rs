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

//! Error type for the store contract, following the same
//! `failure::{Context, Fail}` shape used by the chain and txpool crates.

use std::fmt::{self, Display};

use failure::{Context, Fail};

/// Store error definition.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Store failure kinds.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// No entry found for the given key.
	#[fail(display = "Not found")]
	NotFound,
	/// `push` was asked to extend the chain at the wrong height.
	#[fail(display = "Height mismatch: expected {}, got {}", _0, _1)]
	HeightMismatch(u64, u64),
	/// `pop_above` was asked to pop above a hash that isn't on the chain.
	#[fail(display = "Pop target not on chain")]
	NotOnChain,
	/// Underlying storage I/O failed.
	#[fail(display = "Store I/O error: {}", _0)]
	Io(String),
}

impl Error {
	/// The error's kind.
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
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
