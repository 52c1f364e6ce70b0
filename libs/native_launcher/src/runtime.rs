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

//! The seam between native code and the managed object runtime.
//!
//! Managed-runtime capabilities are looked up by name and signature on every attempt and invoked
//! through a [`RuntimeSession`]. Every object handed out by a session is a local handle owned by
//! the caller; wrap it with [`RuntimeSession::scoped`] so it is released on every exit path.

use anyhow::Result;
use std::mem::ManuallyDrop;
use std::ops::Deref;

/// How a capability is dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Instance,
    Static,
}

/// What a capability hands back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnKind {
    Object,
    Void,
}

/// A named, signature-qualified method on a managed class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capability {
    pub name: &'static str,
    pub signature: &'static str,
    pub kind: CallKind,
    pub returns: ReturnKind,
}

impl Capability {
    const fn instance(name: &'static str, signature: &'static str, returns: ReturnKind) -> Self {
        Self { name, signature, kind: CallKind::Instance, returns }
    }
}

/// `Context.getPackageManager()`.
pub const GET_PACKAGE_MANAGER: Capability = Capability::instance(
    "getPackageManager",
    "()Landroid/content/pm/PackageManager;",
    ReturnKind::Object,
);

/// `PackageManager.getLaunchIntentForPackage(String)`.
pub const GET_LAUNCH_INTENT_FOR_PACKAGE: Capability = Capability::instance(
    "getLaunchIntentForPackage",
    "(Ljava/lang/String;)Landroid/content/Intent;",
    ReturnKind::Object,
);

/// `Context.startActivity(Intent)`.
pub const START_ACTIVITY: Capability =
    Capability::instance("startActivity", "(Landroid/content/Intent;)V", ReturnKind::Void);

/// `Toast.makeText(Context, CharSequence, int)`.
pub const TOAST_MAKE_TEXT: Capability = Capability {
    name: "makeText",
    signature: "(Landroid/content/Context;Ljava/lang/CharSequence;I)Landroid/widget/Toast;",
    kind: CallKind::Static,
    returns: ReturnKind::Object,
};

/// `Looper.prepare()`. Throws if the calling thread already has a Looper.
pub const LOOPER_PREPARE: Capability = Capability {
    name: "prepare",
    signature: "()V",
    kind: CallKind::Static,
    returns: ReturnKind::Void,
};

/// `Toast.show()`.
pub const TOAST_SHOW: Capability = Capability::instance("show", "()V", ReturnKind::Void);

pub const PACKAGE_MANAGER_CLASS: &str = "android/content/pm/PackageManager";
pub const TOAST_CLASS: &str = "android/widget/Toast";
pub const LOOPER_CLASS: &str = "android/os/Looper";

/// An argument passed to an invoked capability.
#[derive(Debug)]
pub enum Arg<'a, O> {
    Object(&'a O),
    Int(i32),
}

/// A managed runtime that native threads can attach to.
pub trait ManagedRuntime: Send + Sync {
    type Session<'a>: RuntimeSession
    where
        Self: 'a;

    /// Attaches the calling thread to the runtime. The thread is detached when the returned
    /// session is dropped.
    fn attach(&self) -> Result<Self::Session<'_>>;
}

/// Operations available to a thread attached to a [`ManagedRuntime`].
pub trait RuntimeSession {
    /// A local object handle. It must be given back through [`RuntimeSession::release`].
    type Object;
    /// A resolved capability. Method identifiers are not handles and need no release.
    type Method: Copy;

    /// A new handle to the activity hosting this process.
    fn activity(&self) -> Result<Self::Object>;

    /// The runtime class of `object`.
    fn class_of(&self, object: &Self::Object) -> Result<Self::Object>;

    /// Looks up a class by its binary name, e.g. `android/widget/Toast`.
    fn find_class(&self, name: &str) -> Result<Self::Object>;

    /// Resolves `capability` on `class`.
    fn resolve(&self, class: &Self::Object, capability: &Capability) -> Result<Self::Method>;

    /// Invokes `method` on `receiver`, which is the target object for instance capabilities and
    /// the declaring class for static ones. Returns `None` for void capabilities and for a null
    /// result.
    fn invoke(
        &self,
        receiver: &Self::Object,
        method: Self::Method,
        args: &[Arg<'_, Self::Object>],
    ) -> Result<Option<Self::Object>>;

    /// Creates a managed string holding `value`.
    fn new_string(&self, value: &str) -> Result<Self::Object>;

    /// Gives a local handle back to the runtime.
    fn release(&self, object: Self::Object);

    /// Wraps `object` so that it is released when the wrapper goes out of scope.
    fn scoped(&self, object: Self::Object) -> Local<'_, Self>
    where
        Self: Sized,
    {
        Local { session: self, object: ManuallyDrop::new(object) }
    }
}

/// A local handle released back to its session on drop.
pub struct Local<'s, S: RuntimeSession> {
    session: &'s S,
    object: ManuallyDrop<S::Object>,
}

impl<S: RuntimeSession> Deref for Local<'_, S> {
    type Target = S::Object;

    fn deref(&self) -> &S::Object {
        &self.object
    }
}

impl<S: RuntimeSession> Drop for Local<'_, S> {
    fn drop(&mut self) {
        // SAFETY: `self.object` is taken exactly once, here, and never touched afterwards.
        let object = unsafe { ManuallyDrop::take(&mut self.object) };
        self.session.release(object);
    }
}
