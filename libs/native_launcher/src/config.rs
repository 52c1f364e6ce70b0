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

//! Build-time configuration of the launcher.

use log::LevelFilter;
use std::time::Duration;

/// Package launched when none is supplied through `NATIVE_LAUNCHER_TARGET` at build time.
const DEFAULT_TARGET_PACKAGE: &str = "com.NovaFlareEngine";

/// The package started by the shim. Fixed when the crate is compiled.
pub const TARGET_PACKAGE: &str = match option_env!("NATIVE_LAUNCHER_TARGET") {
    Some(package) => package,
    None => DEFAULT_TARGET_PACKAGE,
};

/// Tag under which all messages of this crate appear in logcat.
pub const LOG_TAG: &str = "NovaFlareHelper";

/// Most verbose level forwarded to the device log.
pub const MAX_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// `android.widget.Toast.LENGTH_LONG`.
pub const TOAST_LENGTH_LONG: i32 = 1;

/// Everything a launch attempt needs to know about what it starts and how it reports a miss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    target_package: String,
    not_found_message: String,
    toast_duration: i32,
    poll_timeout: Duration,
}

impl LaunchConfig {
    /// Creates a configuration targeting `target_package`.
    pub fn new(target_package: impl Into<String>) -> Self {
        let target_package = target_package.into();
        let not_found_message = format!("{} not found!", display_name(&target_package));
        Self {
            target_package,
            not_found_message,
            toast_duration: TOAST_LENGTH_LONG,
            poll_timeout: Duration::ZERO,
        }
    }

    /// The configuration baked into this build.
    pub fn from_build_env() -> Self {
        Self::new(TARGET_PACKAGE)
    }

    pub fn target_package(&self) -> &str {
        &self.target_package
    }

    /// Text of the notification shown when the target is not installed.
    pub fn not_found_message(&self) -> &str {
        &self.not_found_message
    }

    pub fn toast_duration(&self) -> i32 {
        self.toast_duration
    }

    /// How long one iteration of the main loop waits for native events. Zero polls without
    /// blocking.
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self::from_build_env()
    }
}

/// Last dot-separated segment of a package name, e.g. `NovaFlareEngine` for
/// `com.NovaFlareEngine`.
fn display_name(package: &str) -> &str {
    package.rsplit('.').find(|segment| !segment.is_empty()).unwrap_or(package)
}
