//! The demo sketches, each a complete `setup()`/`loop()` program for the simulated board.

pub mod blink;
pub mod curtain;
pub mod latch;
pub mod traffic_light;

pub use blink::BlinkSketch;
pub use curtain::CurtainSketch;
pub use latch::LatchSketch;
pub use traffic_light::TrafficLightSketch;
