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

use super::search::ScheduleSearch;
use chrono::{DateTime, Local};
use egui_extras::{Column, DatePickerButton, TableBuilder};
use log::warn;
use rasp_client::{Segment, TransportType};

/// Transport schedule page
pub fn ui(search: &mut ScheduleSearch, ui: &mut egui::Ui) {
    search.poll();

    draw_route_row(search, ui);
    ui.add_space(4.0);
    draw_date_row(search, ui);
    ui.add_space(4.0);
    draw_transport_row(search, ui);
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        let button = ui.add_enabled(!search.is_searching(), egui::Button::new("Search"));
        if button.clicked() {
            // Rejections are already logged by the controller
            let _ = search.search();
        }
        if search.is_searching() {
            ui.spinner();
        }
        if let Some(message) = search.last_error() {
            ui.colored_label(egui::Color32::from_rgb(220, 80, 80), message);
        }
    });

    ui.separator();
    draw_segments(search.segments(), ui);
}

fn draw_route_row(search: &mut ScheduleSearch, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label("From");
        let from = ui.add(egui::TextEdit::singleline(&mut search.form.from).desired_width(180.0));
        if from.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            search.resolve_from();
        }
        ui.weak(&search.form.request.from);

        if ui.button("⇄").on_hover_text("Swap").clicked() {
            search.form.swap();
        }

        ui.label("To");
        let to = ui.add(egui::TextEdit::singleline(&mut search.form.to).desired_width(180.0));
        if to.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            search.resolve_to();
        }
        ui.weak(&search.form.request.to);
    });
}

fn draw_date_row(search: &mut ScheduleSearch, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label("Date");
        let mut date = search.form.date;
        if ui
            .add(DatePickerButton::new(&mut date).id_salt("schedule_date"))
            .changed()
        {
            search.form.set_date(date);
        }

        let today = Local::now().date_naive();
        if ui.button("Today").clicked() {
            search.form.set_today(today);
        }
        if ui.button("Tomorrow").clicked() {
            search.form.set_tomorrow(today);
        }
    });
}

fn draw_transport_row(search: &mut ScheduleSearch, ui: &mut egui::Ui) {
    ui.horizontal_wrapped(|ui| {
        let mut all = search.form.all_complete();
        let master = egui::Checkbox::new(&mut all, "any").indeterminate(search.form.some_complete());
        if ui.add(master).changed() {
            search.form.set_all(all);
        }

        ui.separator();

        let toggles: Vec<(TransportType, bool)> = search
            .form
            .checklist()
            .iter()
            .map(|t| (t.transport, t.checked))
            .collect();
        for (transport, mut checked) in toggles {
            if ui.checkbox(&mut checked, transport.as_str()).changed() {
                search.form.set_checked(transport, checked);
            }
        }
    });
}

fn draw_segments(segments: &[Segment], ui: &mut egui::Ui) {
    if segments.is_empty() {
        ui.weak("No segments");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .header(20.0, |mut header| {
            for title in ["Departure", "Arrival", "Route", "Number", "Type", "Duration", "Carrier"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for segment in segments {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(format_time(&segment.departure));
                    });
                    row.col(|ui| {
                        ui.label(format_time(&segment.arrival));
                    });
                    row.col(|ui| {
                        ui.label(&segment.thread.title);
                    });
                    row.col(|ui| {
                        ui.monospace(&segment.thread.number);
                    });
                    row.col(|ui| {
                        ui.label(&segment.thread.transport_type);
                    });
                    row.col(|ui| {
                        ui.label(format_duration(segment.duration));
                    });
                    row.col(|ui| {
                        draw_carrier(segment, ui);
                    });
                });
            }
        });
}

fn draw_carrier(segment: &Segment, ui: &mut egui::Ui) {
    let Some(carrier) = &segment.thread.carrier else {
        ui.weak("-");
        return;
    };

    match carrier.url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => {
            if ui.link(&carrier.title).on_hover_text(url).clicked() {
                if let Err(e) = webbrowser::open(url) {
                    warn!("Failed to open {url}: {e}");
                }
            }
        }
        None => {
            ui.label(&carrier.title);
        }
    }
}

/// Clock time of an RFC 3339 timestamp in its own offset, or the raw text if
/// it does not parse
fn format_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds.max(0.0) / 60.0).round() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("2024-05-01T06:10:00+03:00"), "06:10");
        assert_eq!(format_time("06:10"), "06:10");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5400.0), "1h 30m");
        assert_eq!(format_duration(600.0), "10m");
        assert_eq!(format_duration(0.0), "0m");
    }
}
