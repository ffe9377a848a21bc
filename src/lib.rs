// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
