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

//! Schedule search controller.
//!
//! Queries are dispatched to a [`ScheduleBackend`] which answers over an
//! unbounded channel. Replies are applied on the UI thread by
//! [`ScheduleSearch::poll`], so the controller never blocks a frame.

use super::form::ScheduleForm;
use log::{debug, error, info, warn};
use rasp_client::{
    CitySuggestion, ClientConfig, ClientError, RaspClient, ScheduleResponse, SearchRequest,
    Segment,
};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Reasons a search was not dispatched
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("missed some params")]
    MissingParams,

    #[error("a search is already in flight")]
    AlreadySearching,
}

/// Which end of the route a suggest lookup resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

/// Result delivered back to the controller by a backend
#[derive(Debug)]
pub enum BackendReply {
    Search(Result<ScheduleResponse, ClientError>),
    Suggest(Side, Result<CitySuggestion, ClientError>),
}

/// Dispatches schedule and suggest queries.
///
/// Implementations must not block; every call eventually sends exactly one
/// [`BackendReply`] on `reply` unless the receiver is gone.
pub trait ScheduleBackend {
    fn search(&self, request: SearchRequest, reply: UnboundedSender<BackendReply>);

    fn suggest(&self, side: Side, city_name: String, reply: UnboundedSender<BackendReply>);
}

/// Backend running [`RaspClient`] queries on a dedicated tokio runtime
pub struct RaspBackend {
    runtime: tokio::runtime::Runtime,
    client: RaspClient,
    ctx: egui::Context,
}

impl RaspBackend {
    pub fn new(config: ClientConfig, ctx: egui::Context) -> std::io::Result<Self> {
        Ok(Self {
            runtime: tokio::runtime::Runtime::new()?,
            client: RaspClient::new(config),
            ctx,
        })
    }

    fn deliver(reply: &UnboundedSender<BackendReply>, ctx: &egui::Context, message: BackendReply) {
        if reply.send(message).is_err() {
            debug!("Schedule reply dropped, receiver closed");
        }
        ctx.request_repaint();
    }
}

impl ScheduleBackend for RaspBackend {
    fn search(&self, request: SearchRequest, reply: UnboundedSender<BackendReply>) {
        let client = self.client.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = client.search(&request).await;
            Self::deliver(&reply, &ctx, BackendReply::Search(result));
        });
    }

    fn suggest(&self, side: Side, city_name: String, reply: UnboundedSender<BackendReply>) {
        let client = self.client.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = client.suggest_city(&city_name).await;
            Self::deliver(&reply, &ctx, BackendReply::Suggest(side, result));
        });
    }
}

/// Search form plus the in-flight state and last results
pub struct ScheduleSearch {
    pub form: ScheduleForm,
    backend: Box<dyn ScheduleBackend>,
    reply_tx: UnboundedSender<BackendReply>,
    reply_rx: UnboundedReceiver<BackendReply>,
    is_searching: bool,
    segments: Vec<Segment>,
    last_error: Option<String>,
}

impl ScheduleSearch {
    pub fn new(form: ScheduleForm, backend: Box<dyn ScheduleBackend>) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            form,
            backend,
            reply_tx,
            reply_rx,
            is_searching: false,
            segments: Vec::new(),
            last_error: None,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// Segments of the last successful search, as returned by the API
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Message of the last failed query, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Dispatch one search from the current form snapshot
    pub fn search(&mut self) -> Result<(), SearchError> {
        if self.is_searching {
            warn!("Search rejected: a search is already in flight");
            return Err(SearchError::AlreadySearching);
        }

        if !self.form.is_complete() {
            error!("{}", SearchError::MissingParams);
            return Err(SearchError::MissingParams);
        }

        let request = self.form.request.clone();
        info!(
            "Searching {} -> {} on {} ({})",
            request.from,
            request.to,
            request.date,
            request.transport_types_param()
        );

        self.is_searching = true;
        self.backend.search(request, self.reply_tx.clone());
        Ok(())
    }

    /// Resolve the departure text into a station code
    pub fn resolve_from(&mut self) {
        self.resolve(Side::From);
    }

    /// Resolve the destination text into a station code
    pub fn resolve_to(&mut self) {
        self.resolve(Side::To);
    }

    fn resolve(&mut self, side: Side) {
        let city_name = match side {
            Side::From => self.form.from.clone(),
            Side::To => self.form.to.clone(),
        };
        debug!("Resolving {side:?} city '{city_name}'");
        self.backend.suggest(side, city_name, self.reply_tx.clone());
    }

    /// Apply every reply received since the last poll
    pub fn poll(&mut self) {
        while let Ok(reply) = self.reply_rx.try_recv() {
            match reply {
                BackendReply::Search(Ok(response)) => {
                    info!("Search returned {} segments", response.segments.len());
                    self.segments = response.segments;
                    self.last_error = None;
                    self.is_searching = false;
                }
                BackendReply::Search(Err(e)) => {
                    error!("Schedule search failed: {e}");
                    self.last_error = Some(e.to_string());
                    self.is_searching = false;
                }
                BackendReply::Suggest(side, Ok(suggestion)) => {
                    debug!("Resolved {side:?} to {} ({})", suggestion.title, suggestion.code);
                    let (text, code) = match side {
                        Side::From => (&mut self.form.from, &mut self.form.request.from),
                        Side::To => (&mut self.form.to, &mut self.form.request.to),
                    };
                    *text = suggestion.title;
                    *code = suggestion.code;
                }
                BackendReply::Suggest(side, Err(e)) => {
                    warn!("City suggest for {side:?} failed: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rasp_client::{Thread, TransportType};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockLog {
        searches: Vec<SearchRequest>,
        suggests: Vec<(Side, String)>,
    }

    /// Backend answering synchronously with canned replies
    struct MockBackend {
        log: Arc<Mutex<MockLog>>,
        response: Option<ScheduleResponse>,
        suggestion: Option<CitySuggestion>,
        reply_immediately: bool,
    }

    impl ScheduleBackend for MockBackend {
        fn search(&self, request: SearchRequest, reply: UnboundedSender<BackendReply>) {
            self.log.lock().unwrap().searches.push(request);
            if self.reply_immediately {
                let result = self
                    .response
                    .clone()
                    .ok_or(ClientError::Status(reqwest::StatusCode::BAD_GATEWAY));
                reply.send(BackendReply::Search(result)).unwrap();
            }
        }

        fn suggest(&self, side: Side, city_name: String, reply: UnboundedSender<BackendReply>) {
            self.log.lock().unwrap().suggests.push((side, city_name));
            let result = self
                .suggestion
                .clone()
                .ok_or(ClientError::MalformedSuggest("missing [1][0]"));
            reply.send(BackendReply::Suggest(side, result)).unwrap();
        }
    }

    fn segment(number: &str) -> Segment {
        Segment {
            thread: Thread {
                number: number.to_string(),
                ..Thread::default()
            },
            ..Segment::default()
        }
    }

    fn controller(
        response: Option<ScheduleResponse>,
        suggestion: Option<CitySuggestion>,
        reply_immediately: bool,
    ) -> (ScheduleSearch, Arc<Mutex<MockLog>>) {
        let log = Arc::new(Mutex::new(MockLog::default()));
        let backend = MockBackend {
            log: log.clone(),
            response,
            suggestion,
            reply_immediately,
        };
        let form = ScheduleForm::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        (ScheduleSearch::new(form, Box::new(backend)), log)
    }

    #[test]
    fn test_search_dispatches_one_query_and_shows_segments() {
        let response = ScheduleResponse {
            segments: vec![segment("6001"), segment("6003")],
            ..ScheduleResponse::default()
        };
        let (mut search, log) = controller(Some(response.clone()), None, true);
        search.form.from = "A".to_string();
        search.form.to = "B".to_string();
        search.form.set_all(false);
        search.form.set_checked(TransportType::Train, true);
        search.form.set_checked(TransportType::Suburban, true);

        assert_eq!(search.search(), Ok(()));
        assert!(search.is_searching());
        search.poll();

        let log = log.lock().unwrap();
        assert_eq!(log.searches.len(), 1);
        assert_eq!(log.searches[0].transport_types_param(), "train,suburban");
        assert_eq!(search.segments(), response.segments.as_slice());
        assert!(!search.is_searching());
    }

    #[test]
    fn test_search_without_types_reports_missing_params() {
        let (mut search, log) = controller(None, None, true);
        search.form.from = "A".to_string();
        search.form.to = "B".to_string();
        search.form.set_all(false);

        assert_eq!(search.search(), Err(SearchError::MissingParams));
        assert!(!search.is_searching());
        assert!(log.lock().unwrap().searches.is_empty());
    }

    #[test]
    fn test_search_without_texts_reports_missing_params() {
        let (mut search, log) = controller(None, None, true);
        search.form.from = "A".to_string();

        assert_eq!(search.search(), Err(SearchError::MissingParams));
        assert!(log.lock().unwrap().searches.is_empty());
    }

    #[test]
    fn test_second_search_rejected_while_in_flight() {
        let (mut search, log) = controller(None, None, false);
        search.form.from = "A".to_string();
        search.form.to = "B".to_string();

        assert_eq!(search.search(), Ok(()));
        assert_eq!(search.search(), Err(SearchError::AlreadySearching));
        assert_eq!(log.lock().unwrap().searches.len(), 1);
    }

    #[test]
    fn test_failed_search_keeps_previous_segments() {
        let (mut search, _log) = controller(None, None, true);
        search.segments = vec![segment("old")];
        search.form.from = "A".to_string();
        search.form.to = "B".to_string();

        assert_eq!(search.search(), Ok(()));
        search.poll();

        assert!(!search.is_searching());
        assert_eq!(search.segments(), &[segment("old")]);
        assert!(search.last_error().is_some());
    }

    #[test]
    fn test_suggest_sets_text_and_code() {
        let suggestion = CitySuggestion {
            code: "c213".to_string(),
            title: "Москва".to_string(),
        };
        let (mut search, log) = controller(None, Some(suggestion), true);
        search.form.to = "моск".to_string();

        search.resolve_to();
        search.poll();

        assert_eq!(search.form.to, "Москва");
        assert_eq!(search.form.request.to, "c213");
        assert_eq!(log.lock().unwrap().suggests, vec![(Side::To, "моск".to_string())]);
    }

    #[test]
    fn test_failed_suggest_leaves_fields() {
        let (mut search, _log) = controller(None, None, true);
        search.form.from = "nowhere".to_string();
        let code = search.form.request.from.clone();

        search.resolve_from();
        search.poll();

        assert_eq!(search.form.from, "nowhere");
        assert_eq!(search.form.request.from, code);
    }
}
