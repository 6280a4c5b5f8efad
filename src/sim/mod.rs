// Copyright (c) 2017-2021 Fabian Schuiki

//! The event-driven simulator.
//!
//! This module implements the discrete-event simulation of hardware designs:
//! runtime signals, a coalescing future-event queue, a virtual machine for
//! process programs, and the kernel that advances time and delta cycles.

mod engine;
mod event;
mod process;
mod program;
mod signal;
mod time;
mod tracer;

pub use self::engine::*;
pub use self::event::*;
pub use self::process::*;
pub use self::program::*;
pub use self::signal::*;
pub use self::time::*;
pub use self::tracer::*;
