//! Lidar Sensor - writes a mock scan to `lidar_data` each time the last one
//! has been consumed.

use anyhow::Result;
use clap::Parser;
use filecomm_core::{Direction, StreamHandle};
use filecomm_nodes::{logging, pacer, CommonArgs, LidarScan, NodeConfig, ShutdownToken, SystemLog};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "lidar-sensor")]
#[command(about = "Mock lidar publishing scans over a filecomm channel")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.common.debug);

    let settings = args.common.resolve()?;
    let mut ctx = settings.build_context()?;
    let log = SystemLog::new(ctx.root(), "Lidar");

    let mut packet_id = 0u32;
    let mut rng = rand::rng();
    let lidar = ctx.create_stream(
        NodeConfig::LIDAR_STREAM,
        Direction::Write,
        move |h: &mut StreamHandle<'_>| {
            packet_id += 1;
            let scan = LidarScan::generate(packet_id, &mut rng);
            println!("{}", scan.announcement(h.data_path()));
            scan.send(h);
        },
    );
    let lidar = match lidar {
        Ok(id) => id,
        Err(e) => {
            log.note(&format!("Failed to create lidar stream: {}", e));
            return Err(e.into());
        }
    };

    if args.common.clean_start {
        ctx.reset_markers(lidar)?;
    }

    let shutdown = ShutdownToken::on_ctrl_c()?;
    info!("Lidar sensor started in {}", ctx.root().display());
    log.note("Process A (lidar_sensor) started.");

    pacer::run(
        &mut ctx,
        settings.poll_interval(),
        settings.max_ticks,
        &shutdown,
    );

    ctx.teardown();
    log.note("Process A (lidar_sensor) stopped.");
    Ok(())
}
