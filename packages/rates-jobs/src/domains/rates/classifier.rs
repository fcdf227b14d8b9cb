//! Walks participant → authorisation server → API resource and picks out
//! loans and financings resources.

use directory_client::{Participant, ShapeError};
use serde_json::Value;
use tracing::{debug, warn};

use super::models::{Classified, ClassifiedRecord, ProductFamily};

/// Classify every API resource in the directory by product family.
///
/// Only the first discovery endpoint of a resource is examined. Absent fields
/// at any level contribute nothing; a field of the wrong JSON type on the path
/// to a resource fails the whole classification. `OrganisationId` is only read
/// once a resource has matched a family, and the display names are log-only.
pub fn classify(participants: &[Value]) -> Result<Classified, ShapeError> {
    let mut classified = Classified::default();

    for (index, raw) in participants.iter().enumerate() {
        let participant = Participant::from_value(raw, index)?;
        let organisation_name = participant
            .organisation_name()
            .ok()
            .flatten()
            .unwrap_or_default();

        for server in participant.authorisation_servers()? {
            let brand = server
                .customer_friendly_name()
                .ok()
                .flatten()
                .unwrap_or_default();
            for resource in server.api_resources()? {
                let Some(url) = resource.first_endpoint_url()? else {
                    continue;
                };
                let Some(family) = ProductFamily::from_endpoint_url(url) else {
                    continue;
                };

                let Some(organisation_id) = participant.organisation_id()? else {
                    warn!(
                        path = resource.path(),
                        family = %family,
                        "Skipping resource of participant without OrganisationId"
                    );
                    continue;
                };

                debug!(
                    organisation_id,
                    organisation_name,
                    brand,
                    api_family_type = resource.family_type().ok().flatten().unwrap_or_default(),
                    family = %family,
                    "Classified API resource"
                );

                classified.push(ClassifiedRecord {
                    organisation_id: organisation_id.to_string(),
                    family,
                    payload: resource.raw().clone(),
                });
            }
        }
    }

    Ok(classified)
}
