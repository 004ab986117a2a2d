//! End-to-end tests driving the board sessions through the in-memory
//! simulator, the same request/response contract a real serial link
//! implements.

use homeauto_lib::client::{AirConditioner, CurtainControl};
use homeauto_lib::protocol::board2::CurtainSetMode;
use homeauto_lib::simulator::{SimulatedBoard, SimulatedTransport};
use homeauto_lib::Error;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn air_update_reads_simulator_defaults() {
    let mut air = AirConditioner::new(SimulatedTransport::new(SimulatedBoard::AirConditioner));
    air.open().unwrap();
    air.update().unwrap();

    assert_close(air.desired_temperature(), 25.0);
    assert_close(air.ambient_temperature(), 24.0);
    assert_eq!(air.fan_speed(), 0);
}

#[test]
fn air_set_then_update_round_trips() {
    let mut air = AirConditioner::new(SimulatedTransport::new(SimulatedBoard::AirConditioner));
    air.open().unwrap();

    air.set_desired_temperature(24.5).unwrap();
    // Optimistic cache, before any readback.
    assert_close(air.desired_temperature(), 24.5);

    air.update().unwrap();
    assert_close(air.desired_temperature(), 24.5);
    // 24.5 > ambient 24.0, the simulated firmware turns the fan on.
    assert_eq!(air.fan_speed(), 30);

    air.set_desired_temperature(20.0).unwrap();
    air.update().unwrap();
    assert_close(air.desired_temperature(), 20.0);
    assert_eq!(air.fan_speed(), 0);
}

#[test]
fn air_set_rejects_out_of_range_without_touching_cache() {
    let mut air = AirConditioner::new(SimulatedTransport::new(SimulatedBoard::AirConditioner));
    air.open().unwrap();
    air.update().unwrap();

    assert!(matches!(
        air.set_desired_temperature(9.9),
        Err(Error::Range { .. })
    ));
    assert!(matches!(
        air.set_desired_temperature(999.0),
        Err(Error::Range { .. })
    ));
    assert_close(air.desired_temperature(), 25.0);
}

#[test]
fn curtain_update_reads_simulator_defaults() {
    let mut curtain = CurtainControl::new(SimulatedTransport::new(SimulatedBoard::Curtain));
    curtain.open().unwrap();
    curtain.update().unwrap();

    // Raw 32/63 reported as a percentage.
    assert_close(curtain.curtain_status(), 50.8);
    assert_close(curtain.outdoor_temperature(), 20.0);
    assert_close(curtain.outdoor_pressure(), 101.3);
    assert_close(curtain.light_intensity(), 200.0);
}

#[test]
fn curtain_set_percent_round_trips_at_extremes() {
    let mut curtain = CurtainControl::new(SimulatedTransport::new(SimulatedBoard::Curtain));
    curtain.open().unwrap();

    curtain.set_curtain_status(100.0).unwrap();
    curtain.update().unwrap();
    assert_close(curtain.curtain_status(), 100.0);

    curtain.set_curtain_status(0.0).unwrap();
    curtain.update().unwrap();
    assert_close(curtain.curtain_status(), 0.0);
}

#[test]
fn curtain_raw_mode_uses_device_units() {
    let mut curtain = CurtainControl::new(SimulatedTransport::new(SimulatedBoard::Curtain));
    curtain.set_curtain_mode(CurtainSetMode::Raw);
    curtain.open().unwrap();

    curtain.set_curtain_status(63.0).unwrap();
    curtain.update().unwrap();
    assert_close(curtain.curtain_status(), 63.0);

    assert!(matches!(
        curtain.set_curtain_status(63.1),
        Err(Error::Range { .. })
    ));
    assert!(matches!(
        curtain.set_curtain_status(80.0),
        Err(Error::Range { .. })
    ));
}

#[test]
fn curtain_update_with_nondefault_light_high_cmd() {
    let mut sim = SimulatedTransport::new(SimulatedBoard::Curtain);
    sim.set_light_high_cmd(0x0A);

    let mut curtain = CurtainControl::new(sim);
    curtain.set_light_high_cmd(0x0A);
    curtain.open().unwrap();
    curtain.update().unwrap();

    assert_close(curtain.light_intensity(), 200.0);
}

#[test]
fn session_on_closed_transport_fails_recoverably() {
    let mut air = AirConditioner::new(SimulatedTransport::new(SimulatedBoard::AirConditioner));
    assert!(!air.is_open());
    assert!(matches!(air.update(), Err(Error::NotOpen)));
    assert!(matches!(
        air.set_desired_temperature(25.0),
        Err(Error::NotOpen)
    ));
}
