// Copyright 2025 0xjcf
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg_attr(not(feature = "std"), no_std)]

//! # tick-fsm-core
//! The transition-table engine behind `tick-fsm`: a tiny finite-state machine that is
//! driven by one polling call per iteration of an embedded control loop.
//!
//! A machine owns a registry of [`State`]s and an ordered [`TransitionTable`] of
//! `(source, trigger) -> target` edges. Every [`StateMachine::tick`] runs the current
//! state's loop hook once; a returned [`Trigger`] is dispatched through
//! [`StateMachine::fire`], which external code may also call directly.
//!
//! ```rust
//! use tick_fsm_core::{Context, ManualClock, State, StateMachine, Trigger};
//!
//! const TIMEOUT: Trigger = Trigger::from_code(1);
//!
//! struct Wait(&'static str, u64);
//!
//! impl State for Wait {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//!
//!     fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
//!         (cx.elapsed_ms() > self.1).then_some(TIMEOUT)
//!     }
//! }
//!
//! let mut machine = StateMachine::new(ManualClock::new());
//! let on = machine.add_state(Wait("On", 100));
//! let off = machine.add_state(Wait("Off", 100));
//! machine.add_transition(on, TIMEOUT, off);
//! machine.add_transition(off, TIMEOUT, on);
//!
//! machine.start(on);
//! machine.clock().advance(101);
//! assert!(machine.tick());
//! assert_eq!(machine.current_state(), Some(off));
//! ```

extern crate alloc;
#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod clock;
pub mod diagnostics;
pub mod error;
pub mod machine;
pub mod state;
pub mod table;
pub mod test_utils;
pub mod trigger;

pub use clock::{Clock, FnClock, ManualClock};
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use diagnostics::{Diagnostic, DiagnosticSink, FmtSink, Silent};
#[cfg(feature = "debug-log")]
pub use diagnostics::LogSink;
#[cfg(feature = "std")]
pub use diagnostics::TracingSink;
pub use error::FsmError;
pub use machine::StateMachine;
pub use state::{Context, State, StateId};
pub use table::{DEFAULT_CAPACITY, Edge, EdgeStore, GrowableEdges, GrowthPolicy, TransitionTable};
pub use trigger::Trigger;

pub mod prelude {
    pub use crate::{
        Clock, Context, DiagnosticSink, ManualClock, State, StateId, StateMachine, Trigger,
    };
}
