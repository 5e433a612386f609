// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Structured log message definitions.
//!
//! Log text lives in typed structs with `Display` implementations rather
//! than inline format strings, so wording stays consistent and tests can
//! assert on it.

pub mod messages;
