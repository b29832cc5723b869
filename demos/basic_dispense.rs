//! Basic dispensation example.
//!
//! Demonstrates building a dispenser session from configuration and
//! running a confirmed dispense without real hardware: mock pins stand in
//! for GPIO, and a background thread plays the part of the break-beam
//! edge detector.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use treat_dispenser::{
    BeamSensor, DeliveryHandle, Dispenser, Millis, SystemConfig,
};

/// Mock delay provider backed by thread sleeps.
struct SleepDelay;

impl embedded_hal::delay::DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Mock output pin for demonstration.
struct MockPin {
    state: bool,
}

impl MockPin {
    fn new() -> Self {
        Self { state: false }
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.state = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state = false;
        Ok(())
    }
}

/// Mock beam sensor: a thread breaking the beam every 50 ms.
struct DemoBeam {
    stop: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl DemoBeam {
    fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl BeamSensor for DemoBeam {
    type Error = Infallible;

    fn watch(&mut self, deliveries: DeliveryHandle) -> Result<(), Self::Error> {
        let stop = self.stop.clone();
        self.worker = Some(thread::spawn(move || {
            while !stop.load(Ordering::Acquire) {
                deliveries.signal_edge();
                thread::sleep(Duration::from_millis(50));
            }
        }));
        Ok(())
    }

    fn unwatch(&mut self) -> Result<(), Self::Error> {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        Ok(())
    }
}

fn main() {
    println!("=== Basic Dispense Example ===\n");

    // Load configuration from TOML
    let toml_content = r#"
[dispensers.demo]
name = "Demo Dispenser"
capacity = 10
timeout_ms = 2000
steps_per_treat = 53
pulse_half_period_ms = 5
debounce_ms = 20
confirm_policy = "full-rotation"
revision = "breadboard"
"#;

    let config: SystemConfig =
        treat_dispenser::parse_config(toml_content).expect("Failed to parse config");

    let demo = config.dispenser("demo").expect("demo entry should exist");
    let pins = demo.pin_map();
    println!("Configuration loaded: '{}'", demo.name);
    println!(
        "Pin map: step={} dir={} beam={} (breadboard revision)",
        pins.step, pins.dir, pins.beam
    );

    // In production these would be GPIO pins built from the pin map;
    // here they are mocks
    let mut dispenser = Dispenser::builder()
        .from_config(&config, "demo")
        .expect("demo entry should exist")
        .step_pin(MockPin::new())
        .dir_pin(MockPin::new())
        .delay(SleepDelay)
        .beam(DemoBeam::new())
        // Tighten the timeout so a wiring mistake fails the demo fast
        .timeout(Millis(1_000))
        .build()
        .expect("Failed to build dispenser");

    println!("\nDispenser ready: {} treats loaded", dispenser.remaining_treats());

    println!("\n=== Dispensing 3 treats ===");
    match dispenser.dispense(3) {
        Ok(()) => println!("All treats delivered."),
        Err(e) => println!("Dispense failed: {}", e),
    }

    println!("Remaining treats:       {}", dispenser.remaining_treats());
    println!("Delivered this session: {}", dispenser.delivered());
    println!("Unconfirmed deliveries: {}", dispenser.unconfirmed_deliveries());

    dispenser.close().expect("close should release the beam registration");
    println!("\n=== Example Complete ===");
    println!("In production code, inject GPIO pins from your platform HAL.");
}
