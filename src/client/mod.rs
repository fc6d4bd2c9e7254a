//! Send loop.
//!
//! [`Sender`] runs one exchange; [`Dispatcher`] opens the connection and runs
//! exchanges for every payload and loop iteration.

mod config;
mod dispatcher;
mod sender;
mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use config::*;
pub use dispatcher::*;
pub use sender::*;
pub use source::*;
