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

//! A NativeActivity shim that starts a companion package the first time the screen is touched.
//!
//! The native activity thread runs a [`main_loop::MainLoop`] over the activity's looper. Each
//! touch-down is offered to the [`dispatcher::EventDispatcher`], which, while no other attempt is
//! in flight, spawns a detached thread that attaches to the Java VM and starts the target
//! package's launch intent (see [`bridge`]).

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod event;
pub mod launch_guard;
pub mod main_loop;
pub mod runtime;

#[cfg(target_os = "android")]
pub mod android;
#[cfg(target_os = "android")]
pub mod jni_runtime;

/// Initialize logging once per process.
#[cfg(target_os = "android")]
pub fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_tag(config::LOG_TAG)
            .with_max_level(config::MAX_LOG_LEVEL),
    );
}

/// Initialize logging once per process. `RUST_LOG` overrides the default level.
#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(config::MAX_LOG_LEVEL)
        .parse_default_env()
        .try_init();
}
