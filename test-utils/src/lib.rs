mod background_reader;
mod constants;
mod kill_on_drop;
mod mock;
mod ports;
pub mod predicates;
mod reqwest;
mod signal;

pub use background_reader::{BackgroundReader, BackgroundReaderError};
pub use constants::ROCKET_STARTED_STRING;
pub use kill_on_drop::{ChildKillOnDropExt, KillOnDropChild};
pub use mock::{setup_config, MockBackend, MockConfig, MockScoping};
pub use ports::next_port;
pub use reqwest::RQ;
pub use signal::ChildKillTermExt;
