// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! refill-storage: on-disk state for the refill engine

mod json;
mod lock;
mod responses;
mod status;

pub use json::{sanitize_key, JsonStore, StorageError};
pub use lock::{FileRunLock, RunLockGuard};
pub use responses::ResponseLog;
pub use status::{AccountSnapshot, StatusStore, SubscriptionSnapshot};
