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

//! Turns touch-down events into guarded, detached launch attempts.

use log::{debug, error, info};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::bridge::{run_launch_attempt, LaunchOutcome};
use crate::config::LaunchConfig;
use crate::event::{InputEvent, InputStatus, LifecycleCommand};
use crate::launch_guard::{LaunchGuard, LaunchPermit};
use crate::main_loop::NativeEventHandler;
use crate::runtime::ManagedRuntime;

/// Name of every launch thread. Independent of the package name, which may hold any character.
const LAUNCH_THREAD_NAME: &str = "native-launcher";

/// Handle to a spawned launch attempt. The dispatcher never waits on it; dropping it detaches
/// the thread.
#[derive(Debug)]
pub struct LaunchTask {
    handle: JoinHandle<Option<LaunchOutcome>>,
}

impl LaunchTask {
    /// Wait for the attempt to finish. `None` if it failed before reaching the package manager.
    pub fn join(self) -> thread::Result<Option<LaunchOutcome>> {
        self.handle.join()
    }
}

/// Result of dispatching one input event.
#[derive(Debug)]
pub struct Dispatch {
    pub status: InputStatus,
    /// The attempt spawned for this event, if the event won the launch guard.
    pub task: Option<LaunchTask>,
}

/// Receives events from the native loop and starts launch attempts on touch-down.
pub struct EventDispatcher<R: ManagedRuntime + 'static> {
    runtime: Arc<R>,
    guard: Arc<LaunchGuard>,
    config: Arc<LaunchConfig>,
}

impl<R: ManagedRuntime + 'static> EventDispatcher<R> {
    pub fn new(runtime: Arc<R>, guard: Arc<LaunchGuard>, config: LaunchConfig) -> Self {
        Self { runtime, guard, config: Arc::new(config) }
    }

    pub fn guard(&self) -> &Arc<LaunchGuard> {
        &self.guard
    }

    /// Handles `event`. Touch-down events are always reported as handled, even when a launch is
    /// already in flight and nothing new is spawned.
    pub fn dispatch_input(&self, event: &InputEvent) -> Dispatch {
        if !event.is_touch_down() {
            return Dispatch { status: InputStatus::Unhandled, task: None };
        }
        let task = match self.guard.try_permit() {
            Some(permit) => {
                info!("Touch detected, launching {}...", self.config.target_package());
                self.spawn_launch(permit)
            }
            None => {
                debug!("Touch ignored, a launch is already in progress");
                None
            }
        };
        Dispatch { status: InputStatus::Handled, task }
    }

    /// Lifecycle commands are only observed.
    pub fn dispatch_lifecycle(&self, command: &LifecycleCommand) {
        match command {
            LifecycleCommand::InitWindow => info!("Window initialized"),
            LifecycleCommand::TerminateWindow => info!("Window terminated"),
            LifecycleCommand::GainedFocus => info!("Gained focus"),
            LifecycleCommand::LostFocus => info!("Lost focus"),
            LifecycleCommand::Destroy => info!("Destroy requested"),
            other => debug!("Lifecycle command {:?}", other),
        }
    }

    fn spawn_launch(&self, permit: LaunchPermit) -> Option<LaunchTask> {
        let runtime = Arc::clone(&self.runtime);
        let config = Arc::clone(&self.config);
        let res = thread::Builder::new()
            .name(LAUNCH_THREAD_NAME.to_string())
            .spawn(move || run_launch_attempt(&*runtime, &config, permit));
        match res {
            Ok(handle) => Some(LaunchTask { handle }),
            // The closure, and the permit with it, is dropped when the spawn fails.
            Err(e) => {
                error!("Failed to spawn the launch thread: {}", e);
                None
            }
        }
    }
}

impl<R: ManagedRuntime + 'static> NativeEventHandler for EventDispatcher<R> {
    fn handle_input(&mut self, event: &InputEvent) -> InputStatus {
        // Dropping the task detaches the launch thread.
        self.dispatch_input(event).status
    }

    fn handle_lifecycle(&mut self, command: &LifecycleCommand) {
        self.dispatch_lifecycle(command);
    }
}
