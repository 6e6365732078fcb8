//! Nav Planner - prints lidar scans and answers with motor commands.

use anyhow::Result;
use clap::Parser;
use filecomm_core::{Direction, StreamHandle};
use filecomm_nodes::{
    logging, pacer, print_record, CommonArgs, MotorCommand, NodeConfig, Record, ShutdownToken,
    SystemLog,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "nav-planner")]
#[command(about = "Reads lidar scans and writes motor commands over filecomm channels")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.common.debug);

    let settings = args.common.resolve()?;
    let mut ctx = settings.build_context()?;
    let log = SystemLog::new(ctx.root(), "Navigation");

    let scan_log = log.clone();
    let created = ctx.create_stream(
        NodeConfig::LIDAR_STREAM,
        Direction::Read,
        move |h: &mut StreamHandle<'_>| {
            let record = Record::read_from(h);
            print_record(h.data_path(), &record);

            match record.verifier_matches() {
                Some(true) => {}
                Some(false) => {
                    warn!("Lidar packet failed verification");
                    scan_log.note("Lidar packet failed verification");
                }
                None => warn!("Lidar packet without id or verifier code"),
            }
        },
    );
    if let Err(e) = created {
        log.note("We failed to create new stream!");
        return Err(e.into());
    }

    let mut command_id = 0u32;
    let mut rng = rand::rng();
    let motor = ctx.create_stream(
        NodeConfig::MOTOR_STREAM,
        Direction::Write,
        move |h: &mut StreamHandle<'_>| {
            command_id += 1;
            println!(
                "Writing data packet {} to {}...",
                command_id,
                h.data_path().display()
            );
            MotorCommand::generate(command_id, &mut rng).send(h);
        },
    );
    let motor = match motor {
        Ok(id) => id,
        Err(e) => {
            log.note("We failed to create new motor command stream!");
            return Err(e.into());
        }
    };

    if args.common.clean_start {
        ctx.reset_markers(motor)?;
    }

    let shutdown = ShutdownToken::on_ctrl_c()?;
    info!("Nav planner started in {}", ctx.root().display());
    log.note("Process B (nav_planner) started.");

    pacer::run(
        &mut ctx,
        settings.poll_interval(),
        settings.max_ticks,
        &shutdown,
    );

    ctx.teardown();
    log.note("Process B (nav_planner) stopped.");
    Ok(())
}
