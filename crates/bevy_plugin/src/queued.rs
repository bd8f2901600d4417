/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! A gateway for pathfinders that run as regular Bevy Systems.
//!
//! Agents push requests into a shared queue; your pathfinding System drains
//! some of them each frame (as many as the frame budget allows) and fires the
//! completions. Whatever is left over waits for the next frame.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;
use waymark_core::gateway::{PathCompletion, PathRequest, PathRequestGateway};

use crate::components::PathGateway;

type RequestQueue = VecDeque<(PathRequest, PathCompletion)>;

/// A first-come, first-served queue of path requests.
///
/// Insert it as a Resource and hand out `gateway()` handles to agents.
#[derive(Resource, Clone, Default)]
pub struct QueuedPathfinder {
    queue: Arc<Mutex<RequestQueue>>,
}

impl QueuedPathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A PathGateway Component feeding into this queue.
    pub fn gateway(&self) -> PathGateway {
        PathGateway::new(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, RequestQueue> {
        // A panic while holding the lock cannot leave the queue half-modified.
        match self.queue.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes up to `max_requests` of the oldest requests off the queue.
    ///
    /// Requests whose agents have stopped waiting for them are skipped
    /// and do not count towards the limit.
    pub fn drain(&self, max_requests: usize) -> Vec<(PathRequest, PathCompletion)> {
        let mut queue = self.lock();
        let mut batch = Vec::with_capacity(max_requests.min(queue.len()));

        while batch.len() < max_requests {
            let Some((request, completion)) = queue.pop_front() else {
                break;
            };

            if completion.is_stale() {
                #[cfg(feature = "logging")]
                bevy::log::debug!("Skipping stale path request #{:?}", request.id);
                continue;
            }

            batch.push((request, completion));
        }

        batch
    }
}

impl PathRequestGateway for QueuedPathfinder {
    fn request_path(&self, request: PathRequest, completion: PathCompletion) {
        self.lock().push_back((request, completion));
    }
}
