// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end simulation tests

use approx::assert_relative_eq;
use nalgebra::Point3;
use routersim::{Command, SchedulerState, Simulator, SimulatorConfig};

/// 300 x 300 x 10 slab around the origin, 4 mm tool
fn covering_config() -> SimulatorConfig {
    SimulatorConfig {
        sheet_width: 300.0,
        sheet_height: 300.0,
        sheet_thickness: 10.0,
        sheet_margin: -50.0,
        tool_diameter: 4.0,
        plunge_height: 20.0,
        feed_rate: 120.0,
        ..Default::default()
    }
}

#[test]
fn test_only_move_segment_removes_material() {
    let mut sim = Simulator::new(covering_config()).unwrap();
    sim.load_toolpath("J2,100,0\nM2,100,100").unwrap();
    let summary = sim.run_to_completion(100_000);

    assert!(summary.finished);
    assert_eq!(summary.segments, 2);
    assert_eq!(summary.cutting_segments, 1);
    assert_relative_eq!(summary.removed_volume, 4.0 * 100.0 * 10.0, epsilon = 1e-6);

    let stock = sim.stock();

    // Along the jog
    for x in [0.3, 25.3, 50.3, 75.3, 95.1] {
        assert!(stock.contains_point(&Point3::new(x, 0.7, 5.1)), "jog region cut at x={x}");
        assert!(stock.contains_point(&Point3::new(x, -0.7, 5.1)));
    }

    // Inside the swept strip
    for y in [0.7, 30.3, 60.3, 99.3] {
        assert!(!stock.contains_point(&Point3::new(100.3, y, 5.1)), "strip kept at y={y}");
        assert!(!stock.contains_point(&Point3::new(98.3, y, 0.9)));
        assert!(!stock.contains_point(&Point3::new(101.7, y, 9.1)));
    }

    // Just beside and beyond the strip
    assert!(stock.contains_point(&Point3::new(102.3, 50.1, 5.1)));
    assert!(stock.contains_point(&Point3::new(97.7, 50.1, 5.1)));
    assert!(stock.contains_point(&Point3::new(100.3, 100.3, 5.1)));
    assert!(stock.contains_point(&Point3::new(100.3, -0.3, 5.1)));

    assert_eq!(sim.tool_position(), Point3::new(100.0, 100.0, 0.0));
    assert_eq!(sim.state(), SchedulerState::Idle);
}

#[test]
fn test_removal_visible_in_completing_tick() {
    let mut sim = Simulator::new(covering_config()).unwrap();
    sim.load_toolpath("M2,40,40").unwrap();
    sim.start();

    let probe = Point3::new(20.3, 20.1, 5.1);
    loop {
        let report = sim.tick();
        if report.completed.is_some() {
            assert!(report.removed);
            assert!(!sim.stock().contains_point(&probe));
            break;
        }
        assert!(sim.stock().contains_point(&probe));
        assert_eq!(sim.stock().removal_count(), 0);
    }
}

#[test]
fn test_pause_and_resume_matches_uninterrupted_run() {
    let source = "J3,10,10,15\nJZ,4\nM2,60,10\nM2,60,60\nJZ,15";

    let mut reference = Simulator::new(covering_config()).unwrap();
    reference.load_toolpath(source).unwrap();
    let expected = reference.run_to_completion(100_000);

    let mut sim = Simulator::new(covering_config()).unwrap();
    sim.load_toolpath(source).unwrap();
    sim.start();
    for _ in 0..20 {
        sim.tick();
    }
    sim.stop();
    let paused_at = sim.tick().tool_position;
    assert_eq!(sim.state(), SchedulerState::Paused);

    // Ticks while paused do not move the tool
    for _ in 0..5 {
        assert_eq!(sim.tick().tool_position, paused_at);
    }

    sim.run_to_completion(100_000);
    assert_relative_eq!(
        sim.stock().removed_volume(),
        expected.removed_volume,
        epsilon = 1e-6
    );
    assert_eq!(sim.stock().removal_count(), 2);
}

#[test]
fn test_feed_rate_command_changes_speed() {
    let mut slow = Simulator::new(covering_config()).unwrap();
    slow.load_toolpath("J2,200,0").unwrap();
    let slow_ticks = slow.run_to_completion(100_000).ticks;

    let mut fast = Simulator::new(covering_config()).unwrap();
    fast.load_toolpath("J2,200,0").unwrap();
    fast.submit(Command::SetFeedRate(480.0)).unwrap();
    let fast_ticks = fast.run_to_completion(100_000).ticks;

    assert_eq!(slow_ticks, 100);
    assert_eq!(fast_ticks, 25);
}

#[test]
fn test_gantry_tracks_tool() {
    let mut sim = Simulator::new(covering_config()).unwrap();
    sim.load_toolpath("J3,30,40,12").unwrap();
    sim.run_to_completion(100_000);

    let transforms = sim.gantry().world_transforms();
    let carriage = transforms.last().unwrap();
    assert_relative_eq!(
        carriage.world * Point3::origin(),
        Point3::new(30.0, 40.0, 12.0),
        epsilon = 1e-9
    );
}
