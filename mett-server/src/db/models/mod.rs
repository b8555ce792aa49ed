//! Storage models
//!
//! One module per table. Record ids use the natural key (account and bun
//! class names) where the schema has one; orders, purchases and deposits get
//! generated ids.

pub mod account;
pub mod bun_class;
pub mod deposit;
pub mod order;
pub mod purchase;
pub mod user;

pub use account::{Account, AccountId};
pub use bun_class::{BunClass, BunClassId};
pub use deposit::Deposit;
pub use order::{BunCounts, MettOrder, OrderHistory, OrderId, OrderedBun};
pub use purchase::{Purchase, PurchaseId};
pub use user::{Role, User, UserCreate};
