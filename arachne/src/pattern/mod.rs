// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pattern subsystem: variables, constraints, pattern trees, and the builder API

#[allow(clippy::module_inception)]
mod pattern;
pub use pattern::*;
pub mod build;
pub mod constraint;
pub mod value;
pub mod var;
