// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

pub mod engine;
pub mod validation;
pub mod workflow;
