// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Errors returned by [`RaspClient`](crate::RaspClient) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected suggest response: {0}")]
    MalformedSuggest(&'static str),
}
