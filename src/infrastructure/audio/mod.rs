//! Sound server adapters

mod pactl;

pub use pactl::PactlAudioGateway;
