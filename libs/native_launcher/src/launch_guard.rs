//
// Copyright (C) 2025 The Android Open-Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The flag serializing launch attempts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single atomic flag that is set while a launch attempt is in flight.
///
/// There is no queueing: a caller that loses the race does not launch and is not retried.
#[derive(Debug, Default)]
pub struct LaunchGuard {
    launch_in_progress: AtomicBool,
}

impl LaunchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and returns whether the caller won it, i.e. the flag was clear before.
    pub fn try_acquire(&self) -> bool {
        !self.launch_in_progress.swap(true, Ordering::AcqRel)
    }

    /// Clears the flag. Only the attempt that acquired the guard calls this.
    pub fn release(&self) {
        self.launch_in_progress.store(false, Ordering::Release);
    }

    pub fn is_held(&self) -> bool {
        self.launch_in_progress.load(Ordering::Acquire)
    }

    /// Acquires the guard and ties its release to the returned permit.
    pub fn try_permit(self: &Arc<Self>) -> Option<LaunchPermit> {
        self.try_acquire().then(|| LaunchPermit { guard: Arc::clone(self) })
    }
}

/// Proof that the holder owns the in-flight launch. Dropping it releases the guard, including
/// while unwinding from a panic.
#[derive(Debug)]
#[must_use = "dropping the permit releases the launch guard immediately"]
pub struct LaunchPermit {
    guard: Arc<LaunchGuard>,
}

impl Drop for LaunchPermit {
    fn drop(&mut self) {
        self.guard.release();
    }
}
