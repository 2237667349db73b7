// ABOUTME: Small helpers shared across components
// ABOUTME: Shuffling and order-preserving de-duplication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Shuffle, de-duplication, and bounded unique selection
pub mod shuffle;
