// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: image sources, loading, export, composition files and
//! publishing.

pub mod export;
pub mod media;
pub mod publish;
pub mod serialization;
pub mod source;
