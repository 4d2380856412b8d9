pub mod api_client;
pub mod envelope;
#[cfg(test)]
pub(crate) mod fake;

pub use api_client::{ApiTransport, HttpApiClient};
pub use envelope::{decode_each, rejection_message, ApiEnvelope, DecodedList, ItemError};
