//! The contents of this crate need to be organized better:
//!
//! - Timer (a mix of logging, profiling, and even parallel execution)
//! - IO utilities
//! - Utilities for collections

#[macro_use]
extern crate log;

mod collections;
mod io;
pub mod logger;
mod time;
mod utils;

pub use crate::collections::{wraparound_get, MultiMap};
pub use crate::io::{
    deserialize_btreemap, from_json, read_json, serialize_btreemap, to_json, write_json,
};
pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::{plain_list_names, prettyprint_usize};
