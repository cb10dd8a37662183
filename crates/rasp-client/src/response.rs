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

//! Search response types, mirrored from the documented JSON shape.
//!
//! Fields the API documents as free-form or that it sends as `null` in
//! practice are `Option`s. Every struct tolerates missing keys so a partial
//! payload still deserializes.

use serde::{Deserialize, Serialize};

/// Top-level body of a point-to-point search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleResponse {
    pub pagination: Pagination,
    pub segments: Vec<Segment>,
    pub interval_segments: Vec<IntervalSegment>,
    pub search: SearchInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Pagination {
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
}

/// Station or settlement as it appears in a segment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Station {
    pub code: String,
    pub title: String,
    pub popular_title: Option<String>,
    pub short_title: Option<String>,
    pub transport_type: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub station_type: Option<String>,
    pub station_type_name: Option<String>,
}

impl Station {
    /// Best title for display: the popular title when present.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.popular_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title)
    }
}

/// Departure frequency of an interval thread.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThreadInterval {
    pub density: String,
    pub begin_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarrierCodes {
    pub icao: Option<serde_json::Value>,
    pub sirena: Option<String>,
    pub iata: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Carrier {
    pub code: i64,
    pub title: String,
    pub contacts: Option<String>,
    pub url: Option<String>,
    pub logo_svg: Option<serde_json::Value>,
    pub phone: Option<String>,
    pub codes: Option<CarrierCodes>,
    pub address: Option<String>,
    pub logo: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportSubtype {
    pub color: Option<String>,
    pub code: Option<String>,
    pub title: Option<String>,
}

/// Route a segment runs on.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thread {
    pub uid: String,
    pub title: String,
    pub number: String,
    pub short_title: Option<String>,
    pub thread_method_link: Option<String>,
    pub carrier: Option<Carrier>,
    pub transport_type: String,
    pub vehicle: Option<String>,
    pub transport_subtype: Option<TransportSubtype>,
    pub express_type: Option<serde_json::Value>,
    /// Only present on interval threads.
    pub interval: Option<ThreadInterval>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Price {
    pub cents: i64,
    pub whole: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Place {
    pub currency: String,
    pub price: Price,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TicketsInfo {
    pub et_marker: bool,
    pub places: Vec<Place>,
}

/// A single scheduled departure between the searched points.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Segment {
    /// Arrival time, ISO 8601.
    pub arrival: String,
    /// Departure time, ISO 8601.
    pub departure: String,
    pub from: Station,
    pub to: Station,
    pub thread: Thread,
    pub departure_platform: Option<String>,
    pub arrival_platform: Option<String>,
    pub departure_terminal: Option<serde_json::Value>,
    pub arrival_terminal: Option<String>,
    pub stops: String,
    pub has_transfers: bool,
    pub tickets_info: Option<TicketsInfo>,
    /// Travel time in seconds.
    pub duration: f64,
    pub start_date: String,
}

/// A thread that runs at an interval rather than on a fixed timetable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IntervalSegment {
    pub from: Station,
    pub to: Station,
    pub thread: Thread,
    pub departure_platform: Option<String>,
    pub arrival_platform: Option<String>,
    pub departure_terminal: Option<serde_json::Value>,
    pub arrival_terminal: Option<String>,
    pub stops: String,
    pub has_transfers: bool,
    pub tickets_info: Option<TicketsInfo>,
    pub duration: f64,
    pub start_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchPoint {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub popular_title: Option<String>,
    pub short_title: Option<String>,
    pub title: String,
}

/// Echo of the resolved search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchInfo {
    pub date: Option<String>,
    pub from: SearchPoint,
    pub to: SearchPoint,
}
