use serde::{Deserialize, Serialize};

use super::envelope::EnvelopeBatch;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SendRequest {
    pub envelopes: EnvelopeBatch,
    /// Tells the receiving node not to forward the batch to its peers.
    #[serde(default)]
    pub local_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SendResponse {}
