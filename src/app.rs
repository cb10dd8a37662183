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

use crate::config::AppConfig;
use crate::navigation::{NavigationShell, Page, Router};
use crate::polygon::PolygonEditor;
use crate::schedule::{view, RaspBackend, ScheduleForm, ScheduleSearch};
use log::info;

pub struct GeoTransitApp {
    router: Router,
    shell: NavigationShell,
    editor: PolygonEditor,
    schedule: ScheduleSearch,
}

impl GeoTransitApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        initial_route: Option<&str>,
    ) -> std::io::Result<Self> {
        let backend = RaspBackend::new(config.rasp_client_config(), cc.egui_ctx.clone())?;

        let mut router = Router::new();
        if let Some(route) = initial_route {
            router.navigate(route);
        }
        info!("Starting on {}", router.url());

        Ok(Self {
            router,
            shell: NavigationShell::default(),
            editor: PolygonEditor::new(config),
            schedule: ScheduleSearch::new(ScheduleForm::default(), Box::new(backend)),
        })
    }

    fn draw_navigation(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("GeoTransit");
                ui.separator();

                let active = self.shell.active_index();
                let mut target = None;
                for (pos, link) in self.shell.links().iter().enumerate() {
                    let is_active = i32::try_from(pos).is_ok_and(|pos| pos == active);
                    if ui.selectable_label(is_active, &link.label).clicked() {
                        target = Some(link.route.clone());
                    }
                }
                if let Some(route) = target {
                    self.router.navigate(&route);
                }
            });
        });
    }
}

impl eframe::App for GeoTransitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.shell.observe(&self.router);
        self.draw_navigation(ctx);
        self.shell.observe(&self.router);

        egui::CentralPanel::default().show(ctx, |ui| match self.router.page() {
            Page::PolygonEditor => self.editor.ui(ui),
            Page::TransportSchedule => view::ui(&mut self.schedule, ui),
        });
    }
}
