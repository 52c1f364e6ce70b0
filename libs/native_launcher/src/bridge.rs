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

//! One launch attempt against the managed runtime.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use crate::config::LaunchConfig;
use crate::launch_guard::LaunchPermit;
use crate::runtime::{
    Arg, ManagedRuntime, RuntimeSession, GET_LAUNCH_INTENT_FOR_PACKAGE, GET_PACKAGE_MANAGER,
    LOOPER_CLASS, LOOPER_PREPARE, PACKAGE_MANAGER_CLASS, START_ACTIVITY, TOAST_CLASS,
    TOAST_MAKE_TEXT, TOAST_SHOW,
};

/// How a launch attempt that reached the package manager ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// `startActivity` was called with the target's launch intent.
    Started,
    /// The package manager has no launch intent for the target. `notified` tells whether the
    /// not-found toast was shown.
    TargetMissing { notified: bool },
    /// A launch intent exists but `startActivity` could not be resolved on the activity class.
    StartUnavailable,
}

/// Runs one attempt and releases `permit` as its very last action, whatever the attempt did.
///
/// Failures are logged and never returned: the caller only observes the guard transition and,
/// for tests, the outcome.
pub fn run_launch_attempt<R>(
    runtime: &R,
    config: &LaunchConfig,
    permit: LaunchPermit,
) -> Option<LaunchOutcome>
where
    R: ManagedRuntime + ?Sized,
{
    let outcome = match launch_target(runtime, config) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!("Failed to launch {}: {:#}", config.target_package(), e);
            None
        }
    };
    drop(permit);
    outcome
}

/// Attaches to `runtime`, resolves the launch intent of the configured package and starts it.
///
/// Every handle obtained on the way is released before the session detaches, on success and on
/// each early return.
pub fn launch_target<R>(runtime: &R, config: &LaunchConfig) -> Result<LaunchOutcome>
where
    R: ManagedRuntime + ?Sized,
{
    info!("Attempting to launch {}...", config.target_package());
    let session = runtime.attach().context("Failed to attach to the managed runtime")?;
    launch_with_session(&session, config)
}

fn launch_with_session<S: RuntimeSession>(
    session: &S,
    config: &LaunchConfig,
) -> Result<LaunchOutcome> {
    let activity = session.scoped(session.activity().context("Failed to get the activity")?);
    let activity_class =
        session.scoped(session.class_of(&activity).context("Failed to get the activity class")?);

    let get_package_manager = session
        .resolve(&activity_class, &GET_PACKAGE_MANAGER)
        .context("Failed to resolve getPackageManager")?;
    let package_manager = session
        .invoke(&activity, get_package_manager, &[])
        .context("Failed to call getPackageManager")?
        .map(|pm| session.scoped(pm))
        .context("getPackageManager returned null")?;

    let package_manager_class = session.scoped(
        session.find_class(PACKAGE_MANAGER_CLASS).context("Failed to find PackageManager")?,
    );
    let get_launch_intent = session
        .resolve(&package_manager_class, &GET_LAUNCH_INTENT_FOR_PACKAGE)
        .context("Failed to resolve getLaunchIntentForPackage")?;

    let package_name = session.scoped(
        session.new_string(config.target_package()).context("Failed to create the package name")?,
    );
    let intent = session
        .invoke(&package_manager, get_launch_intent, &[Arg::Object(&*package_name)])
        .context("Failed to call getLaunchIntentForPackage")?
        .map(|intent| session.scoped(intent));

    match intent {
        Some(intent) => {
            info!("Found {}, starting activity...", config.target_package());
            let start_activity = match session.resolve(&activity_class, &START_ACTIVITY) {
                Ok(method) => method,
                Err(e) => {
                    error!("Failed to resolve startActivity: {:#}", e);
                    return Ok(LaunchOutcome::StartUnavailable);
                }
            };
            session
                .invoke(&activity, start_activity, &[Arg::Object(&*intent)])
                .context("Failed to call startActivity")?;
            info!("{} launched successfully!", config.target_package());
            Ok(LaunchOutcome::Started)
        }
        None => {
            warn!("{} not found or not installed!", config.target_package());
            let notified = match show_not_found_toast(session, &activity, config) {
                Ok(()) => true,
                Err(e) => {
                    debug!("Skipped the not-found toast: {:#}", e);
                    false
                }
            };
            Ok(LaunchOutcome::TargetMissing { notified })
        }
    }
}

fn show_not_found_toast<S: RuntimeSession>(
    session: &S,
    activity: &S::Object,
    config: &LaunchConfig,
) -> Result<()> {
    // Launch threads start without a Looper and makeText refuses to run on them.
    if let Err(e) = prepare_looper(session) {
        debug!("Looper.prepare skipped: {:#}", e);
    }
    let toast_class = session.scoped(session.find_class(TOAST_CLASS)?);
    let make_text = session.resolve(&toast_class, &TOAST_MAKE_TEXT)?;
    let message = session.scoped(session.new_string(config.not_found_message())?);
    let toast = session
        .invoke(
            &toast_class,
            make_text,
            &[Arg::Object(activity), Arg::Object(&*message), Arg::Int(config.toast_duration())],
        )?
        .map(|toast| session.scoped(toast))
        .context("makeText returned null")?;
    let show = session.resolve(&toast_class, &TOAST_SHOW)?;
    session.invoke(&toast, show, &[])?;
    Ok(())
}

/// Gives the calling thread a Looper. Fails if the thread already has one.
fn prepare_looper<S: RuntimeSession>(session: &S) -> Result<()> {
    let looper_class = session.scoped(session.find_class(LOOPER_CLASS)?);
    let prepare = session.resolve(&looper_class, &LOOPER_PREPARE)?;
    session.invoke(&looper_class, prepare, &[])?;
    Ok(())
}
