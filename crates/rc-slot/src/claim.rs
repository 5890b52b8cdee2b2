//! Claim submission collaborator
//!
//! The core builds the payload and decides what a success or failure does to
//! the session. Delivering it is someone else's job.

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;
use crate::spin::Grid;

/// Contact details entered in the claim form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    pub phone: String,
    pub consent: bool,
}

impl ContactDetails {
    pub fn new(email: impl Into<String>, phone: impl Into<String>, consent: bool) -> Self {
        Self {
            email: email.into(),
            phone: phone.into(),
            consent,
        }
    }
}

/// Body of the submit-claim request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPayload {
    pub email: String,
    pub phone: String,
    pub consent: bool,
    /// Grid of the spin being claimed
    pub result: Option<Grid>,
    pub win_amount: u64,
    pub credits: u64,
}

impl ClaimPayload {
    /// Trimmed contact fields plus the session result
    pub fn new(details: &ContactDetails, result: Option<Grid>, win_amount: u64, credits: u64) -> Self {
        Self {
            email: details.email.trim().to_string(),
            phone: details.phone.trim().to_string(),
            consent: details.consent,
            result,
            win_amount,
            credits,
        }
    }
}

/// Delivers a claim to whatever backend records it
pub trait ClaimSubmitter {
    fn submit(&self, payload: &ClaimPayload) -> Result<(), ClaimError>;
}

/// Accepts every claim and logs it
#[derive(Debug, Clone)]
pub struct StubClaimSubmitter {
    endpoint: String,
}

impl StubClaimSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl ClaimSubmitter for StubClaimSubmitter {
    fn submit(&self, payload: &ClaimPayload) -> Result<(), ClaimError> {
        let body = serde_json::to_string(payload).map_err(|e| ClaimError::Submission(e.to_string()))?;
        log::info!("POST {} (stub) {}", self.endpoint, body);
        Ok(())
    }
}

/// Closure-backed submitter
pub struct FnClaimSubmitter<F>
where
    F: Fn(&ClaimPayload) -> Result<(), String>,
{
    f: F,
}

impl<F> FnClaimSubmitter<F>
where
    F: Fn(&ClaimPayload) -> Result<(), String>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ClaimSubmitter for FnClaimSubmitter<F>
where
    F: Fn(&ClaimPayload) -> Result<(), String>,
{
    fn submit(&self, payload: &ClaimPayload) -> Result<(), ClaimError> {
        (self.f)(payload).map_err(ClaimError::Submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let details = ContactDetails::new(" player@example.com ", "+1 555 0100 ", true);
        let grid = Grid::from_rows(&[&["A", "A", "A"], &["B", "B", "B"], &["C", "C", "C"]]);
        let payload = ClaimPayload::new(&details, Some(grid), 20, 28);

        assert_eq!(payload.email, "player@example.com");
        assert_eq!(payload.phone, "+1 555 0100");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["winAmount"], 20);
        assert_eq!(json["credits"], 28);
        assert_eq!(json["result"][1][0], "B");
    }

    #[test]
    fn test_fn_submitter() {
        let failing = FnClaimSubmitter::new(|_| Err("offline".to_string()));
        let payload = ClaimPayload::new(&ContactDetails::default(), None, 0, 0);
        let err = failing.submit(&payload).unwrap_err();
        assert!(matches!(err, ClaimError::Submission(ref m) if m == "offline"));

        assert!(StubClaimSubmitter::new("/api/claim").submit(&payload).is_ok());
    }
}
