// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal planning for normalized patterns
//!
//! This module turns conjunctions into executable traversal plans. It
//! includes fragment representation, candidate expansion, the shortcut
//! rewrite, cost estimation, and both the greedy planner and the
//! exhaustive reference planner.

pub mod candidates;
pub mod conjunction;
pub mod cost;
pub mod fragment;
pub mod greedy;
pub mod reference;
pub(crate) mod shortcut;
pub mod traversal;
