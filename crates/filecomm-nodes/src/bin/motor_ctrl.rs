//! Motor Ctrl - prints every motor command it receives.

use anyhow::Result;
use clap::Parser;
use filecomm_core::{Direction, StreamHandle};
use filecomm_nodes::{
    logging, pacer, print_record, CommonArgs, NodeConfig, Record, ShutdownToken, SystemLog,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "motor-ctrl")]
#[command(about = "Reads motor commands from a filecomm channel")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.common.debug);

    let settings = args.common.resolve()?;
    let mut ctx = settings.build_context()?;
    let log = SystemLog::new(ctx.root(), "Motor ctrl");

    let created = ctx.create_stream(
        NodeConfig::MOTOR_STREAM,
        Direction::Read,
        |h: &mut StreamHandle<'_>| {
            let record = Record::read_from(h);
            print_record(h.data_path(), &record);
        },
    );
    if let Err(e) = created {
        log.note("We failed to create new motor Read stream");
        return Err(e.into());
    }

    // Read-only process: --clean-start has no write channel to reset.
    let shutdown = ShutdownToken::on_ctrl_c()?;
    info!("Motor controller started in {}", ctx.root().display());
    log.note("Process C (motor_ctrl) started.");

    pacer::run(
        &mut ctx,
        settings.poll_interval(),
        settings.max_ticks,
        &shutdown,
    );

    ctx.teardown();
    log.note("Process C (motor_ctrl) stopped.");
    Ok(())
}
