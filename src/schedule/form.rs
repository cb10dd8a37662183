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

//! Schedule search form state.

use chrono::{Local, NaiveDate};
use rasp_client::{SearchRequest, TransportType};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of the transport type checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportToggle {
    pub transport: TransportType,
    pub checked: bool,
}

/// Editable search form: display texts, the request snapshot sent to the
/// API, and the transport type checklist
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleForm {
    /// Departure text as typed or resolved by suggest
    pub from: String,
    /// Destination text as typed or resolved by suggest
    pub to: String,
    pub date: NaiveDate,
    pub request: SearchRequest,
    checklist: Vec<TransportToggle>,
    all_complete: bool,
}

impl Default for ScheduleForm {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl ScheduleForm {
    pub fn new(today: NaiveDate) -> Self {
        let mut form = Self {
            from: String::new(),
            to: String::new(),
            date: today,
            request: SearchRequest::default(),
            checklist: TransportType::ALL
                .into_iter()
                .map(|transport| TransportToggle {
                    transport,
                    checked: true,
                })
                .collect(),
            all_complete: true,
        };
        form.set_today(today);
        form
    }

    pub fn checklist(&self) -> &[TransportToggle] {
        &self.checklist
    }

    /// Whether every checklist entry is checked
    pub fn all_complete(&self) -> bool {
        self.all_complete
    }

    /// Check or uncheck one transport type and resync the request filter
    pub fn set_checked(&mut self, transport: TransportType, checked: bool) {
        if let Some(toggle) = self.checklist.iter_mut().find(|t| t.transport == transport) {
            toggle.checked = checked;
        }
        self.update_all_complete();
    }

    /// Recompute the master toggle after a single entry changed
    pub fn update_all_complete(&mut self) {
        self.all_complete = self.checklist.iter().all(|t| t.checked);
        self.sync_filter_from_checklist();
    }

    /// Some but not all entries are checked
    pub fn some_complete(&self) -> bool {
        !self.all_complete && self.checklist.iter().any(|t| t.checked)
    }

    /// Master toggle: check or uncheck every entry
    pub fn set_all(&mut self, checked: bool) {
        self.all_complete = checked;
        for toggle in &mut self.checklist {
            toggle.checked = checked;
        }
        self.sync_filter_from_checklist();
    }

    /// Rebuild the request transport filter from the checklist, in checklist
    /// order
    pub fn sync_filter_from_checklist(&mut self) {
        self.request.transport_types = self
            .checklist
            .iter()
            .filter(|t| t.checked)
            .map(|t| t.transport)
            .collect();
    }

    /// Exchange departure and destination, texts and codes together
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        std::mem::swap(&mut self.request.from, &mut self.request.to);
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.request.date = date.format(DATE_FORMAT).to_string();
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.set_date(today);
    }

    /// Set the day after `today`. Leaves the date unchanged at the end of the
    /// representable calendar.
    pub fn set_tomorrow(&mut self, today: NaiveDate) {
        if let Some(tomorrow) = today.succ_opt() {
            self.set_date(tomorrow);
        }
    }

    /// Both texts are filled in and at least one transport type is selected
    pub fn is_complete(&self) -> bool {
        !self.from.is_empty() && !self.to.is_empty() && !self.request.transport_types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tomorrow_crosses_month_and_year() {
        let mut form = ScheduleForm::new(date(2024, 1, 31));
        assert_eq!(form.request.date, "2024-01-31");
        form.set_tomorrow(date(2024, 1, 31));
        assert_eq!(form.request.date, "2024-02-01");

        form.set_today(date(2023, 12, 31));
        assert_eq!(form.request.date, "2023-12-31");
        form.set_tomorrow(date(2023, 12, 31));
        assert_eq!(form.request.date, "2024-01-01");
    }

    #[test]
    fn test_swap_twice_restores() {
        let mut form = ScheduleForm::new(date(2024, 5, 1));
        form.from = "Moscow".to_string();
        form.to = "Kazan".to_string();
        form.request.from = "c213".to_string();
        form.request.to = "c43".to_string();
        let original = form.clone();

        form.swap();
        assert_eq!(form.from, "Kazan");
        assert_eq!(form.request.from, "c43");
        assert_eq!(form.to, "Moscow");
        assert_eq!(form.request.to, "c213");

        form.swap();
        assert_eq!(form, original);
    }

    #[test]
    fn test_checklist_filter_follows_toggles() {
        let mut form = ScheduleForm::new(date(2024, 5, 1));
        assert!(form.all_complete());
        assert_eq!(form.request.transport_types, TransportType::ALL.to_vec());

        form.set_all(false);
        assert!(form.request.transport_types.is_empty());
        assert!(!form.some_complete());

        form.set_checked(TransportType::Bus, true);
        form.set_checked(TransportType::Plane, true);
        assert_eq!(
            form.request.transport_types,
            vec![TransportType::Plane, TransportType::Bus]
        );
        assert!(form.some_complete());

        form.set_all(true);
        assert_eq!(form.request.transport_types, TransportType::ALL.to_vec());
        assert!(form.all_complete());
    }

    #[test]
    fn test_checking_last_entry_completes_all() {
        let mut form = ScheduleForm::new(date(2024, 5, 1));
        form.set_checked(TransportType::Water, false);
        assert!(!form.all_complete());
        form.set_checked(TransportType::Water, true);
        assert!(form.all_complete());
    }

    #[test]
    fn test_completeness_requires_texts_and_types() {
        let mut form = ScheduleForm::new(date(2024, 5, 1));
        assert!(!form.is_complete());
        form.from = "A".to_string();
        form.to = "B".to_string();
        assert!(form.is_complete());
        form.set_all(false);
        assert!(!form.is_complete());
    }
}
