// src/ingress/mod.rs
pub mod batcher;
pub mod client;
pub mod ring;

pub use batcher::Batcher;
pub use client::{BatchedIngressClient, DROPPED_COUNTER};
pub use ring::RingBuffer;
