//! Lab lifecycle: create, start, stop.
//!
//! Lab state is owned by the server. Invalid transitions come back as
//! [`CmlError::Remote`] with whatever message the server reported.

use crate::client::{check_path_id, Session};
use crate::error::{CmlError, Result};
use crate::model::{CreateLabRequest, CreatedObject, LabState, LabSummary};
use reqwest::Method;

impl Session {
    /// Create a new lab.
    pub async fn create_lab(&self, title: &str, description: &str) -> Result<LabSummary> {
        tracing::info!(title, "Creating lab");

        let resp = self
            .send_json(Method::POST, "labs", &CreateLabRequest { title, description })
            .await?;
        let created: CreatedObject = Self::decode(resp).await?;

        let lab_id = created
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CmlError::unexpected("/api/v0/labs", "no lab id returned"))?;

        tracing::info!(lab_id = %lab_id, "Lab created");
        Ok(LabSummary {
            title: created.title().unwrap_or(title).to_string(),
            lab_id,
        })
    }

    /// Start every node in a lab.
    pub async fn start_lab(&self, lab_id: &str) -> Result<LabState> {
        check_path_id("lab_id", lab_id)?;
        tracing::info!(lab_id, "Starting lab");
        self.send(Method::PUT, &format!("labs/{lab_id}/start")).await?;
        Ok(LabState::Started)
    }

    /// Stop every node in a lab.
    pub async fn stop_lab(&self, lab_id: &str) -> Result<LabState> {
        check_path_id("lab_id", lab_id)?;
        tracing::info!(lab_id, "Stopping lab");
        self.send(Method::PUT, &format!("labs/{lab_id}/stop")).await?;
        Ok(LabState::Stopped)
    }
}
