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

mod app;
mod config;
mod map;
mod navigation;
mod polygon;
mod schedule;

use app::GeoTransitApp;
use clap::Parser;
use config::AppConfig;
use log::{error, info};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Polygon extrusion editor and transport schedule search
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Page to open on startup (polygon-editor or transport-schedule)
    #[arg(long)]
    tab: Option<String>,

    /// Print the configuration file path and exit
    #[arg(long)]
    print_config_path: bool,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.print_config_path {
        match AppConfig::get_config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => error!("Failed to resolve config path: {e}"),
        }
        return Ok(());
    }

    info!("Starting GeoTransit Desktop...");
    let config = AppConfig::load_or_default();
    config.warn_missing_credentials();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("GeoTransit Desktop"),
        ..Default::default()
    };

    eframe::run_native(
        "GeoTransit Desktop",
        options,
        Box::new(move |cc| {
            let app = GeoTransitApp::new(cc, &config, args.tab.as_deref())?;
            Ok(Box::new(app))
        }),
    )
}
