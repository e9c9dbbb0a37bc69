pub mod builder;
pub mod config;
pub mod errors;
pub mod ftp;
pub mod grammar;
pub mod listing;
pub mod model;
pub mod session;
pub mod timestamp;
pub mod transport;

pub use config::SessionConfig;
pub use errors::{ListingError, SessionError, TransportError, TransportErrorKind};
pub use ftp::SuppaFtpTransport;
pub use listing::{Listing, assemble_listing, assemble_listing_now};
pub use model::{Entry, EntryKind, format_size};
pub use session::{Existence, Session};
pub use transport::{Credentials, Transport, TrustPolicy};
