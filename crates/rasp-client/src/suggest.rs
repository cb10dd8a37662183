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

//! City suggest lookup.
//!
//! The `format=old` suggest endpoint answers with an array of arrays:
//! `[query, [[code, title, ...], ...], ...]`. Only the code and title of the
//! first suggestion are used; everything else is ignored.

use crate::ClientError;

/// First suggestion for a free-text city name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitySuggestion {
    /// Rasp settlement or station code, e.g. `c213`.
    pub code: String,
    /// Display name of the settlement.
    pub title: String,
}

impl CitySuggestion {
    /// Pick `response[1][0][0]` and `response[1][0][1]` out of a suggest body.
    pub fn from_response(response: &serde_json::Value) -> Result<Self, ClientError> {
        let first = response
            .get(1)
            .and_then(|list| list.get(0))
            .ok_or(ClientError::MalformedSuggest("no suggestions"))?;

        let code = first
            .get(0)
            .and_then(serde_json::Value::as_str)
            .ok_or(ClientError::MalformedSuggest("suggestion has no code"))?;
        let title = first
            .get(1)
            .and_then(serde_json::Value::as_str)
            .ok_or(ClientError::MalformedSuggest("suggestion has no title"))?;

        Ok(Self {
            code: code.to_string(),
            title: title.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_suggestion_is_used() {
        let body = json!([
            "моск",
            [["c213", "Москва", "Москва, Россия"], ["c10743", "Москва (Одинцово)"]],
            []
        ]);

        let suggestion = CitySuggestion::from_response(&body).unwrap();
        assert_eq!(suggestion.code, "c213");
        assert_eq!(suggestion.title, "Москва");
    }

    #[test]
    fn test_empty_suggestions_rejected() {
        let body = json!(["zzzz", []]);
        assert!(matches!(
            CitySuggestion::from_response(&body),
            Err(ClientError::MalformedSuggest(_))
        ));
    }

    #[test]
    fn test_non_string_code_rejected() {
        let body = json!(["x", [[213, "Москва"]]]);
        assert!(CitySuggestion::from_response(&body).is_err());
    }
}
