//! In-memory store of dated events, queried and edited through a small
//! boolean condition language such as
//! `date >= 2017-01-01 AND (event == "holiday" OR event == "sport event")`.

pub mod commands;
pub mod date;
pub mod error;
pub mod query;
pub mod store;

pub use date::DateKey;
pub use error::{Error, ErrorKind, Result};
pub use query::Condition;
pub use store::{Entry, EventStore};
