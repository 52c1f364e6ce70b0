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

//! The native activity side: `AndroidApp` as an event source and the exported entry point.

use android_activity::input::{InputEvent as AndroidInputEvent, MotionAction as AndroidMotionAction};
use android_activity::{AndroidApp, InputStatus as AndroidInputStatus, MainEvent, PollEvent};
use anyhow::{Context, Result};
use jni::objects::JObject;
use jni::JavaVM;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LaunchConfig;
use crate::dispatcher::EventDispatcher;
use crate::event::{InputEvent, InputStatus, LifecycleCommand, MotionAction};
use crate::jni_runtime::JniRuntime;
use crate::launch_guard::LaunchGuard;
use crate::main_loop::{MainLoop, NativeEventHandler, NativeEventSource};

/// Polls the looper of the native activity thread.
pub struct AndroidEventSource {
    app: AndroidApp,
}

impl AndroidEventSource {
    pub fn new(app: AndroidApp) -> Self {
        Self { app }
    }
}

impl NativeEventSource for AndroidEventSource {
    fn poll_once(&mut self, timeout: Duration, handler: &mut dyn NativeEventHandler) -> Result<()> {
        let mut input_available = false;
        self.app.poll_events(Some(timeout), |event| match event {
            PollEvent::Main(MainEvent::InputAvailable) => input_available = true,
            PollEvent::Main(event) => handler.handle_lifecycle(&lifecycle_command(&event)),
            _ => {}
        });
        // Input is read outside of the poll callback; the next InputAvailable is only sent once
        // the pending events have been consumed.
        if input_available {
            self.app.input_events(|event| match handler.handle_input(&input_event(event)) {
                InputStatus::Handled => AndroidInputStatus::Handled,
                InputStatus::Unhandled => AndroidInputStatus::Unhandled,
            });
        }
        Ok(())
    }
}

fn lifecycle_command(event: &MainEvent<'_>) -> LifecycleCommand {
    match event {
        MainEvent::InitWindow { .. } => LifecycleCommand::InitWindow,
        MainEvent::TerminateWindow { .. } => LifecycleCommand::TerminateWindow,
        MainEvent::GainedFocus => LifecycleCommand::GainedFocus,
        MainEvent::LostFocus => LifecycleCommand::LostFocus,
        MainEvent::Pause => LifecycleCommand::Pause,
        MainEvent::Resume { .. } => LifecycleCommand::Resume,
        MainEvent::Destroy => LifecycleCommand::Destroy,
        MainEvent::Start => LifecycleCommand::Other("Start"),
        MainEvent::Stop => LifecycleCommand::Other("Stop"),
        MainEvent::LowMemory => LifecycleCommand::Other("LowMemory"),
        MainEvent::ConfigChanged { .. } => LifecycleCommand::Other("ConfigChanged"),
        MainEvent::WindowResized { .. } => LifecycleCommand::Other("WindowResized"),
        MainEvent::RedrawNeeded { .. } => LifecycleCommand::Other("RedrawNeeded"),
        MainEvent::SaveState { .. } => LifecycleCommand::Other("SaveState"),
        _ => LifecycleCommand::Other("Unknown"),
    }
}

// The wildcard arm covers input kinds added by newer backends.
#[allow(unreachable_patterns)]
fn input_event(event: &AndroidInputEvent) -> InputEvent {
    match event {
        AndroidInputEvent::MotionEvent(motion) => InputEvent::Motion(match motion.action() {
            AndroidMotionAction::Down => MotionAction::Down,
            AndroidMotionAction::Up => MotionAction::Up,
            AndroidMotionAction::Move => MotionAction::Move,
            AndroidMotionAction::Cancel => MotionAction::Cancel,
            AndroidMotionAction::PointerDown => MotionAction::PointerDown,
            AndroidMotionAction::PointerUp => MotionAction::PointerUp,
            _ => MotionAction::Other,
        }),
        AndroidInputEvent::KeyEvent(_) => InputEvent::Key,
        _ => InputEvent::Other,
    }
}

/// Builds the JNI runtime for the activity hosting `app`.
fn jni_runtime(app: &AndroidApp) -> Result<JniRuntime> {
    // SAFETY: `vm_as_ptr` returns the process-wide JavaVM, which outlives the native thread.
    let vm = unsafe { JavaVM::from_raw(app.vm_as_ptr().cast()) }.context("Invalid JavaVM")?;
    let activity = {
        let env = vm.attach_current_thread().context("AttachCurrentThread failed")?;
        // SAFETY: `activity_as_ptr` returns the framework's reference to the NativeActivity
        // instance, which stays valid until the activity is destroyed.
        let activity = unsafe { JObject::from_raw(app.activity_as_ptr().cast()) };
        env.new_global_ref(&activity).context("Failed to pin the activity")?
    };
    Ok(JniRuntime::new(vm, activity))
}

/// Run the launcher on the native activity thread until the activity is destroyed.
pub fn run(app: AndroidApp) -> Result<()> {
    let config = LaunchConfig::from_build_env();
    let runtime = Arc::new(jni_runtime(&app)?);
    let dispatcher = EventDispatcher::new(runtime, Arc::new(LaunchGuard::new()), config.clone());
    let mut source = AndroidEventSource::new(app);
    MainLoop::new(dispatcher).run(&mut source, config.poll_timeout())
}

#[no_mangle]
fn android_main(app: AndroidApp) {
    crate::init_logging();
    info!("Native launcher started, target={}", crate::config::TARGET_PACKAGE);
    if let Err(e) = run(app) {
        error!("Native loop failed: {:#}", e);
    }
}
