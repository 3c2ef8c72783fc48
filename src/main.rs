mod display;
mod error;
mod export;
mod request;
mod roster;
mod rotation;
mod web;

use display::{print_schedule, write_schedule_to_file};
use export::export_schedule_to_csv;
use roster::load_roster;
use rotation::{build_schedule, SessionConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| "admin123".to_string()); // Default password, change this!

        println!("Starting web server on port {}...", port);
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, password).await?;
        return Ok(());
    }

    // CLI mode: [roster.csv] [courts] [party size] [rounds]
    let csv_path = args.get(1).cloned().unwrap_or_else(|| {
        if std::path::Path::new("data/roster.csv").exists() {
            "data/roster.csv".to_string()
        } else {
            "roster.csv".to_string()
        }
    });
    let courts: usize = args.get(2).and_then(|v| v.parse().ok()).unwrap_or(2);
    let party_size: u8 = args.get(3).and_then(|v| v.parse().ok()).unwrap_or(4);
    let rounds: u32 = args.get(4).and_then(|v| v.parse().ok()).unwrap_or(6);

    println!("Loading roster from {}...", csv_path);
    let players = load_roster(&csv_path)?;
    let config = SessionConfig::uniform(courts, party_size, rounds);
    println!(
        "Loaded {} players; {} courts of {} ({} seats per round), {} rounds",
        players.len(),
        courts,
        party_size,
        config.capacity(),
        rounds
    );

    let schedule = build_schedule(&config, &players, None)?;

    print_schedule("Session schedule", &schedule);

    write_schedule_to_file("Session schedule", &schedule, "schedule.txt")?;
    export_schedule_to_csv(&schedule, std::path::Path::new("schedule.csv"))?;
    println!("\nSchedule saved to schedule.txt and schedule.csv");

    Ok(())
}
