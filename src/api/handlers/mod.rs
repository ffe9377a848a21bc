// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod engagement;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod trending;
pub mod users;

use serde::Deserialize;

use crate::store::DEFAULT_LIMIT;

/// Offset/limit pagination shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageParams {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// `?q=` search parameter.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> crate::error::Result<&str> {
        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Ok(q),
            _ => Err(crate::error::Error::invalid("search query required")),
        }
    }
}

/// Body naming the acting user on toggle and mark-read endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorBody {
    pub user_id: String,
}
