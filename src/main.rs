use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};

use hostel_desk::{
    init_telemetry, ChangeEvent, DeskCoordinator, HostelDeskConfig, IdentityProvider,
    LaundryStatus, Role, Session, StaticIdentityProvider,
};

#[derive(Parser)]
#[command(name = "hostel-desk")]
#[command(about = "Live workflow & claim-arbitration core for hostel desk services")]
#[command(long_about = "Coordinates laundry service requests and lost-and-found items across \
                       requester, handler and auditor roles, with live role-scoped views and \
                       race-safe claim arbitration. Run 'hostel-desk demo' to watch the engine \
                       work through the standard scenarios.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the end-to-end demo scenario with live feed output
    Demo,
    /// Load the configuration, report problems, and print the result
    ValidateConfig {
        /// Write the default configuration to hostel-desk.toml first
        #[arg(long, help = "Write the default configuration file before validating")]
        write_default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = HostelDeskConfig::load()?;

    match cli.command {
        Commands::Demo => {
            init_telemetry(&config.observability)?;
            run_demo(&config).await
        }
        Commands::ValidateConfig { write_default } => {
            if write_default {
                HostelDeskConfig::default().save_to_file("hostel-desk.toml")?;
                println!("wrote hostel-desk.toml");
            }
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn run_demo(config: &HostelDeskConfig) -> Result<()> {
    let desk = DeskCoordinator::new();
    // Stand-in for the external identity provider.
    let provider = StaticIdentityProvider::new(Session::new(
        config.demo.requester_id.clone(),
        Role::Requester,
    ));
    let requester = provider.current_session().await?;
    let rival = Session::new("resident-002", Role::Requester);
    let handler = Session::new(config.demo.handler_id.clone(), Role::Handler);
    let auditor = Session::new(config.demo.auditor_id.clone(), Role::Auditor);

    // Live staff view over all requests, printed as events arrive.
    let (snapshot, mut request_feed) = desk.subscribe_requests(&auditor)?;
    println!("request snapshot: {} entries", snapshot.len());
    let request_printer = tokio::spawn(async move {
        while let Some(event) = request_feed.recv().await {
            match event {
                ChangeEvent::Added(r) => println!("  + request {} [{}]", r.id, r.status),
                ChangeEvent::Updated(r) => println!("  ~ request {} [{}]", r.id, r.status),
                ChangeEvent::Removed { id } => println!("  - request {id}"),
            }
        }
    });

    let (_, mut item_feed) = desk.subscribe_items(&auditor)?;
    let item_printer = tokio::spawn(async move {
        while let Some(event) = item_feed.recv().await {
            match event {
                ChangeEvent::Added(i) => println!("  + item {} [{}]", i.id, i.status),
                ChangeEvent::Updated(i) => println!("  ~ item {} [{}]", i.id, i.status),
                ChangeEvent::Removed { id } => println!("  - item {id}"),
            }
        }
    });

    // Laundry workflow: skip-ahead is rejected, the linear path works.
    let pickup = Utc::now() + Duration::hours(4);
    let request_id = desk
        .create_laundry_request(&requester, vec!["2 shirts".into()], pickup, None)
        .await?;
    match desk
        .advance_laundry_status(&handler, &request_id, LaundryStatus::Ready, None)
        .await
    {
        Err(e) => println!("skip to ready: {e}"),
        Ok(()) => println!("skip to ready unexpectedly succeeded"),
    }
    for status in [
        LaundryStatus::InProcess,
        LaundryStatus::Ready,
        LaundryStatus::Delivered,
    ] {
        desk.advance_laundry_status(&handler, &request_id, status, None)
            .await?;
    }

    // Claim arbitration: two concurrent claims, exactly one winner.
    let item_id = desk
        .report_lost_item(&handler, "black umbrella", "Accessories", "Library", None)
        .await?;
    let (first, second) = tokio::join!(
        desk.submit_claim(&requester, &item_id, "bought it last month", "room 12"),
        desk.submit_claim(&rival, &item_id, "looks like mine", "room 40"),
    );
    println!(
        "claim race: first={} second={}",
        first.map(|_| "ok".to_string()).unwrap_or_else(|e| e.to_string()),
        second.map(|_| "ok".to_string()).unwrap_or_else(|e| e.to_string()),
    );
    desk.decide_claim(&auditor, &item_id, true, Some("tag matched".into()))
        .await?;

    println!(
        "request counters: {}",
        serde_json::to_string_pretty(&desk.request_counters(&auditor)?)?
    );
    println!(
        "item counters: {}",
        serde_json::to_string_pretty(&desk.item_counters(&auditor)?)?
    );

    // Let the printers drain their buffers, then stop them; their
    // subscriptions detach on drop.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    request_printer.abort();
    item_printer.abort();
    Ok(())
}
