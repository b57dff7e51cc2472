//! Jotter Desktop Application
//!
//! Rich-text notes with live sync and read-only share links.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod bootstrap_config;
mod components;
mod launch;
mod services;
mod state;
mod theme;
mod views;

use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use tracing_subscriber::EnvFilter;

use crate::launch::{launch_route, LaunchOptions};

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jotter=debug")),
        )
        .init();

    let launch = LaunchOptions {
        read_route: launch_route(std::env::args().skip(1)),
    };
    match &launch.read_route {
        Some(route) => tracing::info!("Starting Jotter in read mode for {}", route.requested_id()),
        None => tracing::info!("Starting Jotter..."),
    }

    let config = Config::new().with_window(
        WindowBuilder::new()
            .with_title("Jotter")
            .with_inner_size(LogicalSize::new(1100.0, 720.0)),
    );

    dioxus::LaunchBuilder::new()
        .with_cfg(config)
        .with_context(launch)
        .launch(app::App);
}
