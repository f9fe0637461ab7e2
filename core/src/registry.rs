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

//! A small, generic fan-out registry (§4.7 / §9): subscribers are plain
//! closures, a relay invokes every one of them once, and each handler's
//! return value decides whether it stays subscribed. One instantiation of
//! this type serves reorg events, another serves transaction-accepted
//! events — no per-event-kind registry duplicated by hand.

use std::sync::atomic::{AtomicU64, Ordering};

use bcnode_util::Mutex;

/// What a subscriber returns after handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resubscribe {
	/// Keep this handler registered for the next event.
	Keep,
	/// Drop this handler; it will not be called again.
	Drop,
}

/// An event a registry can relay: either a real payload or the one-shot
/// "the service is stopping" sentinel every outstanding handler receives
/// exactly once before the registry clears.
pub enum Relayed<'a, E> {
	/// A normal event payload.
	Event(&'a E),
	/// The registry is shutting down; no further events will follow.
	Stopped,
}

type Handler<E> = Box<dyn FnMut(Relayed<'_, E>) -> Resubscribe + Send>;

/// Opaque handle returned by `subscribe`, usable to `unsubscribe` early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A resubscribable, one-shot-per-event fan-out registry.
pub struct Registry<E> {
	next_id: AtomicU64,
	handlers: Mutex<Vec<(SubscriptionId, Handler<E>)>>,
}

impl<E> Default for Registry<E> {
	fn default() -> Self {
		Registry {
			next_id: AtomicU64::new(0),
			handlers: Mutex::new(Vec::new()),
		}
	}
}

impl<E> Registry<E> {
	/// Builds an empty registry.
	pub fn new() -> Registry<E> {
		Registry::default()
	}

	/// Registers a handler, returning an id that can later be passed to
	/// `unsubscribe`.
	pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
	where
		F: FnMut(Relayed<'_, E>) -> Resubscribe + Send + 'static,
	{
		let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.handlers.lock().push((id, Box::new(handler)));
		id
	}

	/// Removes a handler before it would otherwise be dropped. No-op if
	/// the id is unknown (already dropped or never valid).
	pub fn unsubscribe(&self, id: SubscriptionId) {
		self.handlers.lock().retain(|(hid, _)| *hid != id);
	}

	/// Number of currently subscribed handlers.
	pub fn len(&self) -> usize {
		self.handlers.lock().len()
	}

	/// Whether the registry currently has no subscribers.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Invokes every currently subscribed handler once with `event`.
	/// Handlers returning `Resubscribe::Drop` are removed; others remain
	/// for the next relay.
	pub fn relay(&self, event: &E) {
		let mut handlers = self.handlers.lock();
		handlers.retain_mut(|(_, handler)| handler(Relayed::Event(event)) == Resubscribe::Keep);
	}

	/// Invokes every outstanding handler exactly once with the stopped
	/// sentinel, then clears the registry. Further `subscribe` calls are
	/// still accepted (restarting the registry), but nothing remains from
	/// before `stop`.
	pub fn stop(&self) {
		let mut handlers = self.handlers.lock();
		for (_, mut handler) in handlers.drain(..) {
			handler(Relayed::Stopped);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	#[test]
	fn relay_invokes_every_handler_once_and_respects_resubscribe() {
		let registry: Registry<u32> = Registry::new();
		let keep_calls = Arc::new(Mutex::new(0));
		let drop_calls = Arc::new(Mutex::new(0));

		{
			let keep_calls = keep_calls.clone();
			registry.subscribe(move |_| {
				*keep_calls.lock() += 1;
				Resubscribe::Keep
			});
		}
		{
			let drop_calls = drop_calls.clone();
			registry.subscribe(move |_| {
				*drop_calls.lock() += 1;
				Resubscribe::Drop
			});
		}

		registry.relay(&1);
		assert_eq!(*keep_calls.lock(), 1);
		assert_eq!(*drop_calls.lock(), 1);
		assert_eq!(registry.len(), 1);

		registry.relay(&2);
		assert_eq!(*keep_calls.lock(), 2);
		assert_eq!(*drop_calls.lock(), 1);
	}

	#[test]
	fn stop_fires_every_outstanding_handler_once_and_clears() {
		let registry: Registry<u32> = Registry::new();
		let stopped = Arc::new(Mutex::new(0));
		for _ in 0..3 {
			let stopped = stopped.clone();
			registry.subscribe(move |event| {
				if matches!(event, Relayed::Stopped) {
					*stopped.lock() += 1;
				}
				Resubscribe::Keep
			});
		}

		registry.stop();
		assert_eq!(*stopped.lock(), 3);
		assert!(registry.is_empty());
	}
}
