//! Lidar -> planner -> motor pipeline with one context per simulated process.

use filecomm_core::{Direction, StreamContext, StreamHandle};
use filecomm_nodes::{LidarScan, MotorCommand, NodeConfig, Record};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

type Inbox = Rc<RefCell<Vec<Record>>>;

fn reader_into(inbox: &Inbox) -> impl FnMut(&mut StreamHandle<'_>) + 'static {
    let inbox = inbox.clone();
    move |h: &mut StreamHandle<'_>| inbox.borrow_mut().push(Record::read_from(h))
}

#[test]
fn test_three_process_pipeline() {
    let temp_dir = TempDir::new().unwrap();

    let mut sensor = StreamContext::new(temp_dir.path()).unwrap();
    let mut packet_id = 0u32;
    let mut sensor_rng = StdRng::seed_from_u64(1);
    let send_scan = move |h: &mut StreamHandle<'_>| {
        packet_id += 1;
        LidarScan::generate(packet_id, &mut sensor_rng).send(h);
    };
    sensor
        .create_stream(NodeConfig::LIDAR_STREAM, Direction::Write, send_scan)
        .unwrap();

    let scans: Inbox = Rc::default();
    let on_scan = reader_into(&scans);
    let mut planner = StreamContext::new(temp_dir.path()).unwrap();
    planner
        .create_stream(NodeConfig::LIDAR_STREAM, Direction::Read, on_scan)
        .unwrap();
    let mut command_id = 0u32;
    let mut planner_rng = StdRng::seed_from_u64(2);
    let send_command = move |h: &mut StreamHandle<'_>| {
        command_id += 1;
        MotorCommand::generate(command_id, &mut planner_rng).send(h);
    };
    planner
        .create_stream(NodeConfig::MOTOR_STREAM, Direction::Write, send_command)
        .unwrap();

    let commands: Inbox = Rc::default();
    let mut motor = StreamContext::new(temp_dir.path()).unwrap();
    let on_command = reader_into(&commands);
    motor
        .create_stream(NodeConfig::MOTOR_STREAM, Direction::Read, on_command)
        .unwrap();

    for _ in 0..5 {
        sensor.tick();
        planner.tick();
        motor.tick();
    }

    let scans = scans.borrow();
    assert_eq!(scans.len(), 5);
    for (i, scan) in scans.iter().enumerate() {
        assert_eq!(scan.lines.len(), 7);
        assert_eq!(scan.field("packet_id"), Some((i + 1).to_string().as_str()));
        assert_eq!(scan.verifier_matches(), Some(true));
    }

    let commands = commands.borrow();
    assert_eq!(commands.len(), 5);
    for command in commands.iter() {
        assert_eq!(command.lines.len(), 4);
        let direction = command.field("direction").unwrap();
        assert!(direction == "FORWARD" || direction == "BACKWARD");
        let left: f64 = command.field("speed_left").unwrap().parse().unwrap();
        assert!((0.0..=1.0).contains(&left));
    }
}

#[test]
fn test_scan_record_format() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = StreamContext::new(temp_dir.path()).unwrap();
    let scan = LidarScan {
        packet_id: 4,
        verifier_code: 52,
        angle_min: -1.5,
        angle_max: 1.25,
        ranges: [5.0, 10.5, 14.75],
    };
    ctx.create_stream("scan", Direction::Write, move |h: &mut StreamHandle<'_>| {
        scan.send(h)
    })
    .unwrap();
    ctx.tick();

    let published = temp_dir.path().join("scan.txt");
    let contents = std::fs::read_to_string(published).unwrap();
    assert_eq!(
        contents,
        "packet_id: 4\nverifier_code: 52\nangle_min: -1.50\nangle_max: 1.25\n\
         range_0: 5.00\nrange_1: 10.50\nrange_2: 14.75\n"
    );
}
