use serde::Deserialize;

/// Upload body for the admin address pool: a single entry or a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressUploadRequest {
    Single { network: String, address: String },
    Bulk { network: String, addresses: Vec<String> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressDeleteRequest {
    pub id: String,
}
