/// Account ledger: balance, fee and overdraft rules, archive state and the
/// per-account operation history.
pub mod account;

/// Passport and phone number, the identity fields accounts are looked up by.
pub mod identity;

/// Immutable history records produced by [`account`] operations.
pub mod operation;

/// Console input parsed into menu actions and amounts.
pub mod command;

/// Account directory interface, plus "in memory" implementation.
/// Owns the accounts and routes operations to them by passport or phone.
pub mod directory;

/// Console session driving the directory. Lives in the library so the
/// integration test can run it against scripted input.
pub mod bin_utils;
