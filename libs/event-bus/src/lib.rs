pub mod circuit_breaker;
pub mod consumer;
pub mod producer;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerError, CircuitState};
pub use consumer::{BusConsumer, BusConsumerConfig};
pub use producer::BusProducer;
