//! Phase timing for setup, solve, update and polish.

#![allow(clippy::module_inception)]
mod timers;
pub(crate) use timers::*;
