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

//! The two worker pools behind the organizer (§5, §4.4 implementation
//! note): a "general" pool for I/O and subscriber dispatch, and a
//! "priority" pool that runs `accept`/`connect` so parallel script
//! verification does not starve I/O workers. Both are reachable through
//! the same small trait object so tests can swap in an inline, same-
//! thread executor instead of real threads.

/// Runs a boxed job to completion before returning. Not fire-and-forget:
/// callers rely on the job having fully run by the time `run` returns, so
/// the organizer's sequential fork walk can resume with the job's effects
/// visible. A thread-pool-backed implementation still parallelizes across
/// *concurrent* callers (e.g. several transaction-organize calls sharing
/// the priority pool), just not within one caller's own call.
pub trait Executor: Send + Sync {
	/// Runs `job`, blocking the caller until it completes.
	fn run<'a>(&self, job: Box<dyn FnOnce() + Send + 'a>);
}

/// Runs every job on the calling thread. Used by tests so assertions can
/// run immediately after `organize` returns without coordinating with
/// background threads.
#[derive(Debug, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
	fn run<'a>(&self, job: Box<dyn FnOnce() + Send + 'a>) {
		job();
	}
}

/// Runs jobs on a bounded rayon thread pool. `ThreadPool::install` blocks
/// the caller until the job completes, which is what makes it sound to
/// hand it a job that borrows data from the caller's stack despite rayon
/// jobs not requiring `'static`.
pub struct RayonExecutor(rayon::ThreadPool);

impl RayonExecutor {
	/// Builds a pool with `workers` threads.
	pub fn new(workers: usize) -> Result<RayonExecutor, rayon::ThreadPoolBuildError> {
		rayon::ThreadPoolBuilder::new()
			.num_threads(workers)
			.build()
			.map(RayonExecutor)
	}
}

impl Executor for RayonExecutor {
	fn run<'a>(&self, job: Box<dyn FnOnce() + Send + 'a>) {
		self.0.install(job);
	}
}

/// Runs `job` on `executor` and returns its result. A thin convenience
/// over `Executor::run` for jobs that produce a value.
pub fn run_on<'a, R, F>(executor: &dyn Executor, job: F) -> R
where
	R: Send,
	F: FnOnce() -> R + Send + 'a,
{
	let mut result: Option<R> = None;
	{
		let slot = &mut result;
		executor.run(Box::new(move || {
			*slot = Some(job());
		}));
	}
	result.expect("Executor::run must run its job before returning")
}
