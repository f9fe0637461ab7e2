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

//! The transaction-side pipeline: a bounded, dependency-aware pool of
//! unconfirmed transactions and the organizer that validates incoming
//! transactions against both the confirmed chain and the pool itself,
//! then reconciles the pool after every block-side reorganization.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]

pub mod entry;
pub mod error;
pub mod organizer;
pub mod pool;
pub mod validator;

pub use crate::entry::{Handler, Outcome, TransactionEntry};
pub use crate::error::{Error, ErrorKind};
pub use crate::organizer::{TransactionEvent, TransactionOrganizer};
pub use crate::pool::TransactionPool;
pub use crate::validator::TxValidator;
