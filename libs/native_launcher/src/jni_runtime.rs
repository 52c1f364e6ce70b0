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

//! `ManagedRuntime` backed by a Java VM through the `jni` crate.

use anyhow::{Context, Result};
use jni::errors::Error as JniError;
use jni::objects::{GlobalRef, JClass, JMethodID, JObject, JStaticMethodID, JValue};
use jni::signature::{Primitive, ReturnType};
use jni::sys::jvalue;
use jni::{AttachGuard, JNIEnv, JavaVM};
use log::warn;
use std::cell::RefCell;

use crate::runtime::{Arg, CallKind, Capability, ManagedRuntime, ReturnKind, RuntimeSession};

/// A Java VM together with the activity that launch attempts run against.
pub struct JniRuntime {
    vm: JavaVM,
    activity: GlobalRef,
}

impl JniRuntime {
    /// `activity` must be a global reference to an `android.content.Context`.
    pub fn new(vm: JavaVM, activity: GlobalRef) -> Self {
        Self { vm, activity }
    }
}

impl ManagedRuntime for JniRuntime {
    type Session<'a> = JniSession<'a>;

    fn attach(&self) -> Result<JniSession<'_>> {
        let env = self.vm.attach_current_thread().context("AttachCurrentThread failed")?;
        Ok(JniSession { env: RefCell::new(env), activity: &self.activity })
    }
}

/// A resolved Java method.
#[derive(Clone, Copy, Debug)]
pub enum JniMethod {
    Instance(JMethodID, ReturnKind),
    Static(JStaticMethodID, ReturnKind),
}

/// The calling thread's attachment to the VM. The thread is detached on drop if this session
/// attached it.
pub struct JniSession<'a> {
    // AttachGuard keeps the session on the thread that attached.
    env: RefCell<AttachGuard<'a>>,
    activity: &'a GlobalRef,
}

/// Turns a failed JNI call into an error, describing and clearing the pending Java exception
/// first so that the next call on `env` is legal.
fn checked<T>(env: &JNIEnv<'_>, result: Result<T, JniError>) -> Result<T> {
    result.map_err(|e| {
        if env.exception_check().unwrap_or(false) {
            let _ = env.exception_describe();
            let _ = env.exception_clear();
        }
        e.into()
    })
}

fn return_type(returns: ReturnKind) -> ReturnType {
    match returns {
        ReturnKind::Object => ReturnType::Object,
        ReturnKind::Void => ReturnType::Primitive(Primitive::Void),
    }
}

impl<'a> RuntimeSession for JniSession<'a> {
    type Object = JObject<'a>;
    type Method = JniMethod;

    fn activity(&self) -> Result<JObject<'a>> {
        let env = self.env.borrow_mut();
        let activity = env.new_local_ref(self.activity.as_obj());
        checked(&env, activity).context("NewLocalRef failed")
    }

    fn class_of(&self, object: &JObject<'a>) -> Result<JObject<'a>> {
        let env = self.env.borrow_mut();
        let class = env.get_object_class(object);
        checked(&env, class).map(JObject::from).context("GetObjectClass failed")
    }

    fn find_class(&self, name: &str) -> Result<JObject<'a>> {
        let mut env = self.env.borrow_mut();
        let class = env.find_class(name);
        checked(&env, class).map(JObject::from).with_context(|| format!("FindClass({name}) failed"))
    }

    fn resolve(&self, class: &JObject<'a>, capability: &Capability) -> Result<JniMethod> {
        let mut env = self.env.borrow_mut();
        let class: &JClass<'a> = class.into();
        let method = match capability.kind {
            CallKind::Instance => env
                .get_method_id(class, capability.name, capability.signature)
                .map(|id| JniMethod::Instance(id, capability.returns)),
            CallKind::Static => env
                .get_static_method_id(class, capability.name, capability.signature)
                .map(|id| JniMethod::Static(id, capability.returns)),
        };
        checked(&env, method)
            .with_context(|| format!("{}{} not found", capability.name, capability.signature))
    }

    fn invoke(
        &self,
        receiver: &JObject<'a>,
        method: JniMethod,
        args: &[Arg<'_, JObject<'a>>],
    ) -> Result<Option<JObject<'a>>> {
        let mut env = self.env.borrow_mut();
        let args: Vec<jvalue> = args
            .iter()
            .map(|arg| match arg {
                Arg::Object(object) => JValue::Object(*object).as_jni(),
                Arg::Int(value) => JValue::Int(*value).as_jni(),
            })
            .collect();
        let (value, returns) = match method {
            JniMethod::Instance(id, returns) => {
                // SAFETY: `id` was resolved on the receiver's class from the capability's
                // signature, and the caller builds `args` from that same signature.
                let value = unsafe {
                    env.call_method_unchecked(receiver, id, return_type(returns), &args)
                };
                (value, returns)
            }
            JniMethod::Static(id, returns) => {
                let class: &JClass<'a> = receiver.into();
                // SAFETY: `id` was resolved on `class` from the capability's signature, and the
                // caller builds `args` from that same signature.
                let value = unsafe {
                    env.call_static_method_unchecked(class, id, return_type(returns), &args)
                };
                (value, returns)
            }
        };
        let value = checked(&env, value).context("Java method threw")?;
        match returns {
            ReturnKind::Void => Ok(None),
            ReturnKind::Object => {
                let object = value.l().context("Java method did not return an object")?;
                Ok((!object.is_null()).then_some(object))
            }
        }
    }

    fn new_string(&self, value: &str) -> Result<JObject<'a>> {
        let env = self.env.borrow_mut();
        let string = env.new_string(value);
        checked(&env, string).map(JObject::from).context("NewStringUTF failed")
    }

    fn release(&self, object: JObject<'a>) {
        let env = self.env.borrow();
        if let Err(e) = env.delete_local_ref(object) {
            warn!("Failed to delete a local reference: {}", e);
        }
    }
}
