//! `enum`s, `struct`s and register knowledge of the AT86RF215.



mod command;
mod config;
mod register;
mod state;



pub use command::*;
pub use config::*;
pub use register::*;
pub use state::*;
