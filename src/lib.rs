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

//! # tick-fsm
//! A tiny finite-state machine for embedded control loops: define states with
//! enter/loop/exit hooks, wire them with `(source, trigger) -> target` edges, and call
//! `tick()` once per loop iteration.
//! `no_std` compatible (needs `alloc`), with optional `log`/`tracing` diagnostics.

pub use tick_fsm_core::*;

pub mod prelude {
    pub use tick_fsm_core::prelude::*;
    pub use tick_fsm_core::triggers;
}
