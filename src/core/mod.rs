//! Engine internals
//!
//! Bottom-up:
//! - `bits`, `layout`: raw record codec and the static field schema
//! - `item`, `owner`, `page`, `grid`: storage model
//! - `allocator`: first-fit grid placement
//! - `conversion`: legacy/native record reshaping
//! - `transfer`, `collection`: moving items between owners
//! - `snapshot`: checksummed copies of a collection

pub mod allocator;
pub mod bits;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod conversion;
pub mod error;
pub mod grid;
pub mod item;
pub mod layout;
pub mod owner;
pub mod page;
pub mod snapshot;
pub mod transfer;
pub mod validation;
