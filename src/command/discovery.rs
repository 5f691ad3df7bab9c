use anyhow::Result;
use chrono::Utc;

use udmi_coord::discovery::{FamilyKey, Update};
use udmi_coord::helpers::read_json_arg;
use udmi_coord::schema::{DiscoveryEvents, FamilyDiscoveryConfig};

use super::{print_json, Session};
use crate::argsets::{
    ConfigureArgs, ObserveArgs, PromoteArgs, RecordResultArgs, ResultsArgs, TickArgs, WithdrawArgs,
};

fn log_update(key: &FamilyKey, update: &Update) {
    match update {
        Update::Applied(phase) => log::info!("{key}: {phase}"),
        Update::Unchanged(phase) => log::info!("{key}: unchanged, still {phase}"),
        Update::Stale { received, current } => {
            log::info!("{key}: ignored generation {received}, current is {current}")
        }
    }
}

/// Persist the scan and print its current state.
fn finish(session: &Session, key: &FamilyKey, update: Update) -> Result<()> {
    log_update(key, &update);
    session.save_scan(key)?;
    match session.coordinator.discovery().family_state(key) {
        Some(state) => print_json(&state),
        None => Ok(()),
    }
}

pub fn configure(args: ConfigureArgs) -> Result<()> {
    let config: FamilyDiscoveryConfig = read_json_arg(&args.config)?;
    let session = Session::open()?;
    session.load_scan(&args.key)?;
    let discovery = session.coordinator.discovery();
    let update = if args.schedule {
        let (generation, update) = discovery.schedule(&args.key, &config)?;
        log::info!("{}: scheduled generation {generation}", args.key);
        update
    } else {
        discovery.configure(&args.key, &config)?
    };
    finish(&session, &args.key, update)
}

pub fn start(key: FamilyKey) -> Result<()> {
    let session = Session::open()?;
    session.load_scan(&key)?;
    let update = session.coordinator.discovery().start(&key)?;
    finish(&session, &key, update)
}

pub fn tick(args: TickArgs) -> Result<()> {
    let session = Session::open()?;
    session.load_scan(&args.key)?;
    let update = session
        .coordinator
        .discovery()
        .tick(&args.key, args.generation, args.elapsed_sec)?;
    finish(&session, &args.key, update)
}

pub fn stop(key: FamilyKey) -> Result<()> {
    let session = Session::open()?;
    session.load_scan(&key)?;
    let update = session.coordinator.discovery().stop(&key)?;
    finish(&session, &key, update)
}

pub fn record_result(args: RecordResultArgs) -> Result<()> {
    let events: DiscoveryEvents = read_json_arg(&args.events)?;
    let session = Session::open()?;
    session.load_scan(&args.key)?;
    let update = session
        .coordinator
        .discovery()
        .record_result(&args.key, args.generation, events)?;
    finish(&session, &args.key, update)
}

pub fn observe(args: ObserveArgs) -> Result<()> {
    let events: DiscoveryEvents = read_json_arg(&args.events)?;
    let session = Session::open()?;
    session.load_scan(&args.key)?;
    let at = args.at.unwrap_or_else(Utc::now);
    let discovery = session.coordinator.discovery();
    discovery.observe_passive(&args.key, events, at)?;
    let held = discovery.snapshot(&args.key).map_or(0, |scan| scan.held_sightings());
    log::info!("{}: holding {held} passive sighting(s)", args.key);
    session.save_scan(&args.key)
}

pub fn withdraw(args: WithdrawArgs) -> Result<()> {
    let session = Session::open()?;
    session.load_scan(&args.key)?;
    if session.coordinator.discovery().withdraw_passive(&args.key, &args.addr)? {
        log::info!("{}: withdrew sighting of {}", args.key, args.addr);
    } else {
        log::info!("{}: no sighting of {} held", args.key, args.addr);
    }
    session.save_scan(&args.key)
}

pub fn promote(args: PromoteArgs) -> Result<()> {
    let session = Session::open()?;
    session.load_scan(&args.key)?;
    let now = args.now.unwrap_or_else(Utc::now);
    let promoted = session.coordinator.discovery().promote_passive(&args.key, now)?;
    log::info!("{}: promoted {promoted} passive sighting(s)", args.key);
    session.save_scan(&args.key)?;
    println!("{promoted}");
    Ok(())
}

pub fn state(device_id: String) -> Result<()> {
    let session = Session::open()?;
    for scan in session.store.load_device_scans(&device_id)? {
        session.coordinator.discovery().restore(scan);
    }
    print_json(&session.coordinator.discovery().discovery_state(&device_id))
}

pub fn results(args: ResultsArgs) -> Result<()> {
    let session = Session::open()?;
    session.load_scan(&args.key)?;
    let results = session.coordinator.discovery().scan_results(&args.key, args.depth)?;
    print_json(&results)
}
