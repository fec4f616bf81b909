//! Domain types shared by every service in the transcoding pipeline:
//! the resolution profile table, the codec enum and its pure mappings to
//! encoder/muxer arguments, the job status state machine, and the bus
//! message schemas that tie Controller -> Worker -> Tracker -> Packager
//! together.
//!
//! Nothing in this crate talks to Redis, Kafka, Postgres or a subprocess —
//! it is the pure, independently testable core that the service crates
//! wrap with I/O.

pub mod codec;
pub mod dash;
pub mod encoder_args;
pub mod job;
pub mod messages;
pub mod resolution;

pub use codec::Codec;
pub use dash::DashProfile;
pub use encoder_args::{EncodeParams, EncoderArgs};
pub use job::{fan_in_satisfied, JobRecord, JobStatus, RepresentationState};
pub use messages::{MpdGenerationMessage, TranscodeTaskMessage};
pub use resolution::{Resolution, ResolutionProfile};
