// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: captions, their store, and saved compositions.

pub mod composition;
pub mod overlay;
pub mod store;
