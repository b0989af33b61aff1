//! jobdeck binary: load the dashboard, print it, refresh on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use jobdeck::render::Region;
use jobdeck::{ApiClient, Config, Dashboard};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; using defaults");
            Config::default()
        }
    };

    log::info!("jobdeck starting against {}", config.api_base_url);
    let api = Arc::new(ApiClient::new(&config.api_base_url));
    let mut dashboard = Dashboard::new(api, config.min_score);

    dashboard.load_dashboard().await;
    print_dashboard(&dashboard);

    let mut interval = tokio::time::interval(Duration::from_secs(config.refresh_minutes * 60));
    // The first tick fires immediately; the initial load above already covered it
    interval.tick().await;

    loop {
        interval.tick().await;
        log::info!("Scheduled refresh");
        dashboard.load_dashboard().await;
        print_dashboard(&dashboard);
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    let regions = &dashboard.regions;

    println!();
    println!(
        "  Active {}   Interviews (7d) {}   Remote {}   High priority {}",
        regions.metrics.active,
        regions.metrics.interviews,
        regions.metrics.remote,
        regions.metrics.high_priority
    );

    println!("\n  Today's agenda");
    match &regions.agenda {
        Region::Loaded { data } => {
            for item in data {
                let link = item
                    .meet_link
                    .as_deref()
                    .map(|l| format!("  {l}"))
                    .unwrap_or_default();
                println!(
                    "    {:<9} {:<24} {:<28} {}{}",
                    item.time, item.company, item.role, item.kind, link
                );
            }
        }
        Region::Empty { message } | Region::Failed { message } => println!("    {message}"),
    }

    println!("\n  Pipeline");
    match &regions.pipeline {
        Region::Loaded { data } => {
            for row in data {
                println!(
                    "    {:<24} {:<28} {:<10} {:<7} {:<6} {:<24} {}",
                    row.company,
                    row.role,
                    row.status,
                    if row.is_remote { "remote" } else { "onsite" },
                    row.priority,
                    row.tech_stack,
                    row.updated
                );
            }
        }
        Region::Empty { message } | Region::Failed { message } => println!("    {message}"),
    }

    for toast in dashboard.toasts.iter() {
        println!("  {} {}", toast.severity.icon(), toast.message);
    }
    println!();
}
