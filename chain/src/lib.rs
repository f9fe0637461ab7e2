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

//! The block-side consensus pipeline: a pool of not-yet-confirmed
//! candidate blocks, a context-free/contextual/full-connect validator, and
//! the organizer that drives the two over a traced fork and mutates the
//! confirmed chain behind the shared [`bcnode_core::ChainLock`].

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]

pub mod error;
pub mod executor;
pub mod organizer;
pub mod pool;
pub mod validator;

pub use crate::error::{Error, ErrorKind};
pub use crate::executor::{Executor, InlineExecutor, RayonExecutor};
pub use crate::organizer::{BlockOrganizer, ReorgEvent};
pub use crate::pool::{BlockPool, Fork, ForkEntry};
pub use crate::validator::Validator;
