use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One extracted listing. Field order is the CSV column order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: String,
    pub position: String,
    pub company: String,
    pub location: String,
    /// `YYYY-MM-DD`, or empty.
    pub date: String,
    pub salary: String,
    pub job_url: String,
}

impl JobRecord {
    /// Key used by the seen-id store.
    ///
    /// Listings without an entity urn fall back to a hash of their URL so they
    /// do not all collide on the empty id. Only a listing with neither yields
    /// an empty key.
    pub fn dedup_key(&self) -> String {
        if !self.job_id.is_empty() {
            return self.job_id.clone();
        }
        if self.job_url.is_empty() {
            return String::new();
        }
        let digest = Sha256::digest(self.job_url.as_bytes());
        format!("url-{}", &hex::encode(digest)[..16])
    }
}
