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

//! Platform-independent view of the events the native loop delivers.

/// The action of a motion event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionAction {
    /// The first pointer went down.
    Down,
    Up,
    Move,
    Cancel,
    /// An additional pointer went down while another one is already touching.
    PointerDown,
    PointerUp,
    Other,
}

/// An input event, reduced to what the dispatcher looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Motion(MotionAction),
    Key,
    Other,
}

impl InputEvent {
    /// Whether this is the first pointer touching the screen.
    pub fn is_touch_down(&self) -> bool {
        matches!(self, InputEvent::Motion(MotionAction::Down))
    }
}

/// What the application reports back to the native loop for an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputStatus {
    Handled,
    Unhandled,
}

/// Coarse commands sent by the activity's main thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleCommand {
    InitWindow,
    TerminateWindow,
    GainedFocus,
    LostFocus,
    Pause,
    Resume,
    /// The activity is being destroyed and waits for the native thread to exit.
    Destroy,
    Other(&'static str),
}
