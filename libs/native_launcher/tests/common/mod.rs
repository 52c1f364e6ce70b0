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

//! An in-memory managed runtime that records what a launch attempt does to it.

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use native_launcher::runtime::{
    Arg, Capability, ManagedRuntime, RuntimeSession, LOOPER_CLASS, PACKAGE_MANAGER_CLASS,
    TOAST_CLASS,
};
use std::cell::Cell;
use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Steps of a launch attempt that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Attach,
    ActivityClass,
    ResolveGetPackageManager,
    GetPackageManager,
    FindPackageManager,
    ResolveGetLaunchIntent,
    ResolveStartActivity,
    StartActivity,
    FindLooper,
    ResolvePrepare,
    PrepareLooper,
    FindToast,
    ResolveMakeText,
    MakeText,
    ResolveShow,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FakeObject {
    Activity,
    Class(String),
    PackageManager,
    Str(String),
    Intent(String),
    Toast(String),
}

#[derive(Debug, Default)]
pub struct FakeState {
    /// Every runtime call, in order, named after the JNI function or capability.
    pub calls: Vec<String>,
    pub live_handles: i64,
    pub attaches: usize,
    pub detaches: usize,
    pub active_sessions: usize,
    /// Name of the thread behind each attach.
    pub attach_threads: Vec<Option<String>>,
    pub max_active_sessions: usize,
    /// Packages passed to `startActivity`.
    pub started: Vec<String>,
    /// Messages of the toasts that were shown.
    pub toasts: Vec<String>,
}

impl FakeState {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

/// Lets a test hold `startActivity` until it decides to let the attempt finish.
pub struct StartGate {
    entered: Receiver<()>,
    release: Sender<()>,
}

impl StartGate {
    /// Waits until an attempt is blocked inside `startActivity`.
    pub fn wait_entered(&self) {
        self.entered.recv_timeout(Duration::from_secs(5)).expect("startActivity never entered");
    }

    /// Lets one blocked `startActivity` return.
    pub fn open(&self) {
        self.release.send(()).expect("no attempt is waiting on the gate");
    }
}

struct Gate {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

pub struct FakeRuntime {
    installed: HashSet<String>,
    fail_at: Option<Step>,
    gate: Option<Gate>,
    looper_required: bool,
    state: Mutex<FakeState>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self {
            installed: HashSet::new(),
            fail_at: None,
            gate: None,
            looper_required: false,
            state: Mutex::default(),
        }
    }

    pub fn with_installed(mut self, package: &str) -> Self {
        self.installed.insert(package.to_string());
        self
    }

    pub fn failing_at(mut self, step: Step) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Makes `makeText` throw on threads that have not prepared a Looper, as on a device.
    pub fn requiring_looper(mut self) -> Self {
        self.looper_required = true;
        self
    }

    pub fn with_start_gate(mut self) -> (Self, StartGate) {
        let (entered_tx, entered_rx) = channel();
        let (release_tx, release_rx) = channel();
        self.gate =
            Some(Gate { entered: Mutex::new(entered_tx), release: Mutex::new(release_rx) });
        (self, StartGate { entered: entered_rx, release: release_tx })
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn fails(&self, step: Step) -> bool {
        self.fail_at == Some(step)
    }

    fn record(&self, call: &str) {
        self.state().calls.push(call.to_string());
    }

    fn hand_out(&self, object: FakeObject) -> FakeObject {
        self.state().live_handles += 1;
        object
    }
}

impl ManagedRuntime for FakeRuntime {
    type Session<'a> = FakeSession<'a>;

    fn attach(&self) -> Result<FakeSession<'_>> {
        self.record("AttachCurrentThread");
        if self.fails(Step::Attach) {
            bail!("JNI_ERR");
        }
        let mut state = self.state();
        state.attaches += 1;
        state.attach_threads.push(thread::current().name().map(str::to_string));
        state.active_sessions += 1;
        state.max_active_sessions = state.max_active_sessions.max(state.active_sessions);
        Ok(FakeSession { runtime: self, looper_prepared: Cell::new(false) })
    }
}

pub struct FakeSession<'a> {
    runtime: &'a FakeRuntime,
    looper_prepared: Cell<bool>,
}

impl Drop for FakeSession<'_> {
    fn drop(&mut self) {
        self.runtime.record("DetachCurrentThread");
        let mut state = self.runtime.state();
        state.detaches += 1;
        state.active_sessions -= 1;
    }
}

impl FakeSession<'_> {
    fn fail_if(&self, step: Step, what: &str) -> Result<()> {
        if self.runtime.fails(step) {
            bail!("{what} (injected failure at {step:?})");
        }
        Ok(())
    }
}

impl RuntimeSession for FakeSession<'_> {
    type Object = FakeObject;
    type Method = &'static str;

    fn activity(&self) -> Result<FakeObject> {
        self.runtime.record("NewLocalRef");
        Ok(self.runtime.hand_out(FakeObject::Activity))
    }

    fn class_of(&self, object: &FakeObject) -> Result<FakeObject> {
        self.runtime.record("GetObjectClass");
        self.fail_if(Step::ActivityClass, "GetObjectClass failed")?;
        match object {
            FakeObject::Activity => {
                Ok(self.runtime.hand_out(FakeObject::Class("android/app/NativeActivity".into())))
            }
            other => Err(anyhow!("class_of unexpected object {other:?}")),
        }
    }

    fn find_class(&self, name: &str) -> Result<FakeObject> {
        self.runtime.record(&format!("FindClass({name})"));
        match name {
            PACKAGE_MANAGER_CLASS => {
                self.fail_if(Step::FindPackageManager, "NoClassDefFoundError")?
            }
            TOAST_CLASS => self.fail_if(Step::FindToast, "NoClassDefFoundError")?,
            LOOPER_CLASS => self.fail_if(Step::FindLooper, "NoClassDefFoundError")?,
            _ => bail!("NoClassDefFoundError: {name}"),
        }
        Ok(self.runtime.hand_out(FakeObject::Class(name.to_string())))
    }

    fn resolve(&self, class: &FakeObject, capability: &Capability) -> Result<&'static str> {
        self.runtime.record(&format!("resolve({})", capability.name));
        let FakeObject::Class(_) = class else {
            bail!("resolve on a non-class {class:?}");
        };
        let step = match capability.name {
            "getPackageManager" => Step::ResolveGetPackageManager,
            "getLaunchIntentForPackage" => Step::ResolveGetLaunchIntent,
            "startActivity" => Step::ResolveStartActivity,
            "makeText" => Step::ResolveMakeText,
            "prepare" => Step::ResolvePrepare,
            "show" => Step::ResolveShow,
            other => bail!("NoSuchMethodError: {other}"),
        };
        self.fail_if(step, "NoSuchMethodError")?;
        Ok(capability.name)
    }

    fn invoke(
        &self,
        receiver: &FakeObject,
        method: &'static str,
        args: &[Arg<'_, FakeObject>],
    ) -> Result<Option<FakeObject>> {
        self.runtime.record(method);
        match (method, receiver, args) {
            ("getPackageManager", FakeObject::Activity, []) => {
                self.fail_if(Step::GetPackageManager, "getPackageManager threw")?;
                Ok(Some(self.runtime.hand_out(FakeObject::PackageManager)))
            }
            (
                "getLaunchIntentForPackage",
                FakeObject::PackageManager,
                [Arg::Object(FakeObject::Str(package))],
            ) => {
                if self.runtime.installed.contains(package) {
                    Ok(Some(self.runtime.hand_out(FakeObject::Intent(package.clone()))))
                } else {
                    Ok(None)
                }
            }
            ("startActivity", FakeObject::Activity, [Arg::Object(FakeObject::Intent(package))]) => {
                if let Some(gate) = &self.runtime.gate {
                    gate.entered.lock().unwrap().send(()).unwrap();
                    gate.release.lock().unwrap().recv().unwrap();
                }
                self.fail_if(Step::StartActivity, "ActivityNotFoundException")?;
                self.runtime.state().started.push(package.clone());
                Ok(None)
            }
            (
                "makeText",
                FakeObject::Class(_),
                [
                    Arg::Object(FakeObject::Activity),
                    Arg::Object(FakeObject::Str(message)),
                    Arg::Int(_),
                ],
            ) => {
                self.fail_if(Step::MakeText, "Can't toast on a thread without a Looper")?;
                if self.runtime.looper_required && !self.looper_prepared.get() {
                    bail!("Can't toast on a thread that has not called Looper.prepare()");
                }
                Ok(Some(self.runtime.hand_out(FakeObject::Toast(message.clone()))))
            }
            ("prepare", FakeObject::Class(_), []) => {
                self.fail_if(Step::PrepareLooper, "Only one Looper may be created per thread")?;
                self.looper_prepared.set(true);
                Ok(None)
            }
            ("show", FakeObject::Toast(message), []) => {
                self.runtime.state().toasts.push(message.clone());
                Ok(None)
            }
            _ => bail!("IllegalArgumentException: {method} on {receiver:?}"),
        }
    }

    fn new_string(&self, value: &str) -> Result<FakeObject> {
        self.runtime.record("NewStringUTF");
        Ok(self.runtime.hand_out(FakeObject::Str(value.to_string())))
    }

    fn release(&self, _object: FakeObject) {
        self.runtime.record("DeleteLocalRef");
        self.runtime.state().live_handles -= 1;
    }
}
