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

//! Search request parameters.
//!
//! Parameter meanings follow the point-to-point reference at
//! <https://yandex.ru/dev/rasp/doc/ru/reference/schedule-point-point>.

/// Response body format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

/// Response language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Russian,
    Ukrainian,
}

impl Lang {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Russian => "ru_RU",
            Self::Ukrainian => "uk_UA",
        }
    }
}

/// Kind of transport a search may be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    Plane,
    Train,
    Suburban,
    Bus,
    Water,
    Helicopter,
}

impl TransportType {
    /// Every transport type, in the order the API documents them.
    pub const ALL: [Self; 6] = [
        Self::Plane,
        Self::Train,
        Self::Suburban,
        Self::Bus,
        Self::Water,
        Self::Helicopter,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plane => "plane",
            Self::Train => "train",
            Self::Suburban => "suburban",
            Self::Bus => "bus",
            Self::Water => "water",
            Self::Helicopter => "helicopter",
        }
    }

    /// Parse the API name of a transport type.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

/// Coding system used for the `from` and `to` station codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum System {
    #[default]
    Yandex,
    Iata,
    Sirena,
    Express,
    Esr,
}

impl System {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yandex => "yandex",
            Self::Iata => "iata",
            Self::Sirena => "sirena",
            Self::Express => "express",
            Self::Esr => "esr",
        }
    }
}

/// Coding system to include alongside station codes in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowSystems {
    #[default]
    Yandex,
    Esr,
}

impl ShowSystems {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yandex => "yandex",
            Self::Esr => "esr",
        }
    }
}

/// Timezone the response times are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultTimezone {
    #[default]
    Moscow,
    Novosibirsk,
}

impl ResultTimezone {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moscow => "Europe/Moscow",
            Self::Novosibirsk => "Asia/Novosibirsk",
        }
    }
}

/// Point-to-point schedule search request.
///
/// The API key is not part of the request; [`RaspClient`](crate::RaspClient)
/// supplies it from its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub format: Format,
    pub lang: Lang,
    /// Departure station or settlement code (e.g. `s9600191`, `c213`).
    pub from: String,
    /// Destination station or settlement code.
    pub to: String,
    /// Travel date as `YYYY-MM-DD`.
    pub date: String,
    pub transport_types: Vec<TransportType>,
    pub system: System,
    pub show_systems: ShowSystems,
    /// Number of results to skip.
    pub offset: u32,
    /// Maximum number of results to return.
    pub limit: u32,
    pub add_days_mask: bool,
    pub result_timezone: ResultTimezone,
    pub transfers: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            format: Format::default(),
            lang: Lang::default(),
            from: "s9600191".to_string(),
            to: "c213".to_string(),
            date: String::new(),
            transport_types: TransportType::ALL.to_vec(),
            system: System::default(),
            show_systems: ShowSystems::default(),
            offset: 0,
            limit: 100,
            add_days_mask: false,
            result_timezone: ResultTimezone::default(),
            transfers: false,
        }
    }
}

impl SearchRequest {
    /// Comma-joined `transport_types` parameter value.
    #[must_use]
    pub fn transport_types_param(&self) -> String {
        self.transport_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Query parameters in the order the API reference lists them.
    #[must_use]
    pub fn query_pairs(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", api_key.to_string()),
            ("from", self.from.clone()),
            ("to", self.to.clone()),
            ("format", self.format.as_str().to_string()),
            ("lang", self.lang.as_str().to_string()),
            ("date", self.date.clone()),
            ("transport_types", self.transport_types_param()),
            ("system", self.system.as_str().to_string()),
            ("show_systems", self.show_systems.as_str().to_string()),
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
            ("add_days_mask", self.add_days_mask.to_string()),
            ("result_timezone", self.result_timezone.as_str().to_string()),
            ("transfers", self.transfers.to_string()),
        ]
    }

    /// URL-encoded query string, without a leading `?`.
    #[must_use]
    pub fn query_string(&self, api_key: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs(api_key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_matches_api_defaults() {
        let request = SearchRequest::default();
        assert_eq!(request.from, "s9600191");
        assert_eq!(request.to, "c213");
        assert_eq!(request.limit, 100);
        assert_eq!(
            request.transport_types_param(),
            "plane,train,suburban,bus,water,helicopter"
        );
    }

    #[test]
    fn test_query_string_parameter_order() {
        let request = SearchRequest {
            date: "2024-03-08".to_string(),
            transport_types: vec![TransportType::Suburban],
            ..Default::default()
        };

        assert_eq!(
            request.query_string("k"),
            "apikey=k&from=s9600191&to=c213&format=json&lang=ru_RU&date=2024-03-08\
             &transport_types=suburban&system=yandex&show_systems=yandex&offset=0\
             &limit=100&add_days_mask=false&result_timezone=Europe%2FMoscow&transfers=false"
        );
    }

    #[test]
    fn test_transport_type_from_name() {
        assert_eq!(TransportType::from_name("water"), Some(TransportType::Water));
        assert_eq!(TransportType::from_name("any"), None);
    }
}
