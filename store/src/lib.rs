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

//! The fast-chain store contract (§6) and an in-memory reference
//! implementation used by the chain and txpool crates' own test suites.

pub mod error;
pub mod memory;
pub mod types;

pub use crate::error::{Error, ErrorKind};
pub use crate::memory::MemoryChainStore;
pub use crate::types::ChainStore;
