use chrono::TimeDelta;
use pinghist::{Database, Probe};
use rand::Rng;
use std::path::Path;
use std::time::Instant;

fn main() -> pinghist::Result<()> {
    env_logger::builder()
        .filter_module("lsm_tree", log::LevelFilter::Warn)
        .filter_module("fjall", log::LevelFilter::Info)
        .filter_module("pinghist", log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    let path = Path::new(".pinghist");

    if path.try_exists()? {
        std::fs::remove_dir_all(path)?;
    }

    let db = Database::builder().open(path)?;

    let end = pinghist::now();
    let start = end - TimeDelta::days(1);

    let started = Instant::now();

    {
        let mut rng = rand::thread_rng();

        for (address, base_latency) in [("10.0.0.1", 35.0), ("127.0.0.1", 0.05)] {
            let mut samples = Vec::with_capacity(86_400);
            let mut ts = start;

            while ts < end {
                // Roughly one lost packet per 200 probes
                let response_time = if rng.gen_bool(0.005) {
                    -1.0
                } else {
                    base_latency * rng.gen_range(0.8..1.5)
                };

                samples.push((ts, response_time));
                ts += TimeDelta::seconds(1);
            }

            db.save_all(address, &samples)?;

            log::info!("[{address}] ingested {} samples", samples.len());
        }
    }

    // NOTE: The most recent probe goes through the probe boundary
    db.record(
        &Probe::TimedOut {
            address: "10.0.0.1".into(),
        },
        end,
    )?;

    log::info!("ingested in {:?}", started.elapsed());

    let Some(address) = db.most_recently_active()? else {
        log::warn!("no samples found");
        return Ok(());
    };

    for _ in 0..5 {
        let started = Instant::now();

        let groups = db.query(&address, start, end + TimeDelta::seconds(1), TimeDelta::hours(1))?;

        log::info!("queried {} groups in {:?}", groups.len(), started.elapsed());

        for group in &groups {
            log::info!(
                "{} min={:.3} avg={:.3} max={:.3} std_dev={:.3} received={} lost={} ({:.2}%)",
                group.start.format("%m/%d %I:%M %P"),
                group.min_time,
                group.avg_time,
                group.max_time,
                group.std_dev,
                group.received,
                group.timed_out,
                group.loss_ratio() * 100.0,
            );
        }
    }

    Ok(())
}
