//! Headless demo session: a synthetic point field, a scripted map pan with
//! throttled nearby queries answered locally, and one add-a-place wizard
//! run persisted through a file store.

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use foundation::geo::{LatLon, Region};
use foundation::time::TimeMs;
use mapview::controller::{MapConfig, MapController, NearbyQuery};
use mapview::points::GeoPoint;
use storage::{keys, FileStore};
use wizard::machine::{BackOutcome, Wizard, WizardSignal};
use wizard::place::{place_steps, PlaceDraft};
use wizard::session::FormSession;

#[derive(Parser, Debug)]
#[command(name = "pinsim", about = "Scripted place-pinning client session")]
struct Args {
    /// Seed for the synthetic point field and generated drafts.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Number of scripted pan events.
    #[arg(long, default_value_t = 12)]
    pan_steps: u32,

    /// Throttle window for nearby queries (ms).
    #[arg(long, default_value_t = 1000)]
    window_ms: u64,

    /// Synthetic points scattered around the start location.
    #[arg(long, default_value_t = 400)]
    point_count: u32,

    /// Where the persisted client state lives.
    #[arg(long, default_value = "pinsim_state.json")]
    state_file: PathBuf,
}

/// Small deterministic generator (splitmix64) so runs are reproducible
/// from the seed alone.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn synthetic_field(seed: u64, count: u32, around: LatLon) -> Vec<GeoPoint> {
    let mut rng = Rng(seed);
    (0..count)
        .map(|i| GeoPoint {
            id: format!("pin-{i:04}"),
            latitude: around.latitude + (rng.next_f64() - 0.5) * 0.4,
            longitude: around.longitude + (rng.next_f64() - 0.5) * 0.4,
            color: String::new(),
            icon: String::new(),
            title: format!("Place {i}"),
        })
        .collect()
}

/// Stand-in for the backend: answer a nearby query from the field.
fn answer_query(field: &[GeoPoint], query: &NearbyQuery) -> Vec<GeoPoint> {
    let radius_deg = query.radius_m / foundation::geo::METERS_PER_DEGREE;
    field
        .iter()
        .filter(|p| {
            (p.latitude - query.center.latitude).abs() <= radius_deg
                && (p.longitude - query.center.longitude).abs() <= radius_deg
        })
        .take(query.limit)
        .cloned()
        .collect()
}

fn run_map_session(args: &Args, field: &[GeoPoint]) -> MapController {
    let start = LatLon::new(37.7749, -122.4194);
    let config = MapConfig {
        throttle_window_ms: args.window_ms,
        ..MapConfig::default()
    };

    let mut now = TimeMs(0);
    let mut controller = MapController::new(config, now);
    controller.permission_granted();

    let mut pending: Option<NearbyQuery> = None;
    if let Some(q) = controller.location_acquired(now, start) {
        pending = Some(q);
    }

    for step in 0..args.pan_steps {
        now = now.plus_ms(250);
        // Drag east a little each tick.
        let region = Region::centered_on(
            LatLon::new(start.latitude, start.longitude + 0.01 * f64::from(step + 1)),
            0.05,
            0.05,
        );
        if let Some(q) = controller.region_changed(now, region) {
            pending = Some(q);
        }
        if let Some(q) = controller.poll(now) {
            pending = Some(q);
        }

        if let Some(query) = pending.take() {
            let batch = answer_query(field, &query);
            info!(seq = query.seq, results = batch.len(), "nearby query answered");
            controller.apply_nearby(query.seq, batch);
        }
    }

    // Let the trailing edge of the last burst fire.
    now = now.plus_ms(args.window_ms);
    if let Some(query) = controller.poll(now) {
        let batch = answer_query(field, &query);
        info!(seq = query.seq, results = batch.len(), "trailing query answered");
        controller.apply_nearby(query.seq, batch);
    }

    info!(
        known = controller.points().len(),
        visible = controller.visible_markers().len(),
        "map session finished"
    );
    controller
}

fn run_wizard_session(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(&args.state_file);
    let mut session = FormSession::open(
        store,
        keys::ADD_PLACE_FORM,
        PlaceDraft::generated(args.seed),
    )?;
    if !session.data().name.is_empty() {
        info!(name = %session.data().name, "resuming a persisted draft");
    }

    let mut wizard = Wizard::new(place_steps())?.with_status_display_ms(500);

    session.update(|d| {
        d.latitude = Some(37.7749);
        d.longitude = Some(-122.4194);
        d.name = "Ritual Coffee".to_string();
        d.rating = Some(5);
        d.must_knows.push("Cash only before 9am".to_string());
    })?;

    while !wizard.is_last_step() {
        match wizard.next(session.data()) {
            Ok(true) => info!(step = wizard.current_step_id(), "advanced"),
            Ok(false) => break,
            Err(message) => {
                warn!(%message, "validation rejected the draft");
                return Ok(());
            }
        }
    }

    // Exercise back navigation once, then return.
    if wizard.back() == BackOutcome::MovedBack {
        wizard.next(session.data()).ok();
    }

    wizard.begin_submit(session.data())?;
    let now = TimeMs(60_000);
    wizard.submit_succeeded(now);
    match wizard.poll(now.plus_ms(500)) {
        Some(WizardSignal::Completed) => {
            info!("pin submitted; clearing the draft");
            session.reset(PlaceDraft::generated(args.seed + 1))?;
        }
        other => warn!(?other, "unexpected wizard signal"),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    info!(?args, "starting scripted session");

    let start = LatLon::new(37.7749, -122.4194);
    let field = synthetic_field(args.seed, args.point_count, start);

    let controller = run_map_session(&args, &field);
    for (name, value) in controller.metrics().snapshot().counters {
        info!(counter = %name, value, "metric");
    }

    if let Err(e) = run_wizard_session(&args) {
        warn!(error = %e, "wizard session failed");
        std::process::exit(1);
    }
}
