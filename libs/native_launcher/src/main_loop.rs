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

//! The native activity thread's poll loop.

use anyhow::Result;
use log::{debug, info};
use std::time::Duration;

use crate::event::{InputEvent, InputStatus, LifecycleCommand};

/// A trait defining how events pulled from a `NativeEventSource` are handled.
pub trait NativeEventHandler {
    /// Handle an input event. This function is called on the thread running the main loop.
    fn handle_input(&mut self, event: &InputEvent) -> InputStatus;

    /// Handle a lifecycle command from the activity's main thread.
    fn handle_lifecycle(&mut self, command: &LifecycleCommand);
}

/// Where the main loop gets its events from, e.g. the looper of a native activity.
pub trait NativeEventSource {
    /// Process every pending source once, waiting at most `timeout` for the first one, and
    /// forward the resulting events to `handler`.
    fn poll_once(&mut self, timeout: Duration, handler: &mut dyn NativeEventHandler) -> Result<()>;
}

/// State of the main loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// A destroy request was observed. No further polling happens.
    Terminated,
}

/// Drives a `NativeEventSource` until the activity asks the native thread to exit.
pub struct MainLoop<H: NativeEventHandler> {
    handler: H,
    state: LoopState,
}

impl<H: NativeEventHandler> MainLoop<H> {
    pub fn new(handler: H) -> Self {
        Self { handler, state: LoopState::Running }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Poll `source` once. Returns the state after the poll.
    pub fn run_once<S: NativeEventSource + ?Sized>(
        &mut self,
        source: &mut S,
        timeout: Duration,
    ) -> Result<LoopState> {
        if self.state == LoopState::Running {
            source.poll_once(timeout, self)?;
        }
        Ok(self.state)
    }

    /// Run the loop on this thread. This function returns once a destroy request is observed or
    /// polling fails.
    pub fn run<S: NativeEventSource + ?Sized>(
        &mut self,
        source: &mut S,
        timeout: Duration,
    ) -> Result<()> {
        while self.run_once(source, timeout)? == LoopState::Running {}
        info!("App is exiting...");
        Ok(())
    }
}

impl<H: NativeEventHandler> NativeEventHandler for MainLoop<H> {
    fn handle_input(&mut self, event: &InputEvent) -> InputStatus {
        if self.state == LoopState::Terminated {
            debug!("Dropping {:?} delivered after destroy", event);
            return InputStatus::Unhandled;
        }
        self.handler.handle_input(event)
    }

    fn handle_lifecycle(&mut self, command: &LifecycleCommand) {
        if self.state == LoopState::Terminated {
            return;
        }
        self.handler.handle_lifecycle(command);
        if *command == LifecycleCommand::Destroy {
            self.state = LoopState::Terminated;
        }
    }
}
