mod analytics;
mod app;
mod audio;
mod cli;
mod config;
mod library;
mod mpris;
mod runtime;
mod session;
mod timer;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
