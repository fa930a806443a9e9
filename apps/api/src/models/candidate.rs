use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The six personal-details fields written to the `candidates` collection
/// when step 1 is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub experience: u8,
    pub position: String,
    pub location: String,
}

/// In-session accumulator. Fields stay `None` until their step is confirmed.
/// `tech_stack` is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<BTreeSet<String>>,
}

impl CandidateData {
    /// Overwrites the personal-details fields; `tech_stack` is untouched.
    pub fn merge_record(&mut self, record: &CandidateRecord) {
        let CandidateRecord {
            name,
            email,
            phone,
            experience,
            position,
            location,
        } = record.clone();

        self.name = Some(name);
        self.email = Some(email);
        self.phone = Some(phone);
        self.experience = Some(experience);
        self.position = Some(position);
        self.location = Some(location);
    }
}
