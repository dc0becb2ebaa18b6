#![allow(dead_code)]

mod server;
mod store;

pub use server::*;
pub use store::*;
