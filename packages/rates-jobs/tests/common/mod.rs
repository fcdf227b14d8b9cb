//! Shared fixtures for rates-jobs integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

pub const LOANS_URL: &str =
    "https://api.banco-um.com.br/open-banking/opendata-loans/v1/personal-loans";
pub const FINANCINGS_URL: &str =
    "https://api.banco-dois.com.br/open-banking/opendata-financings/v1/business-financings";
pub const CHANNELS_URL: &str = "https://api.banco-um.com.br/open-banking/channels/v1/branches";

/// An ApiResource whose discovery endpoints are `urls`, in order.
pub fn resource(family_type: &str, urls: &[&str]) -> Value {
    let endpoints: Vec<Value> = urls.iter().map(|u| json!({ "ApiEndpoint": u })).collect();
    json!({
        "ApiResourceId": format!("res-{}", family_type),
        "ApiFamilyType": family_type,
        "ApiVersion": "1.0.0",
        "ApiDiscoveryEndpoints": endpoints
    })
}

/// A participant with one authorisation server exposing `resources`.
pub fn participant(org: &str, resources: Vec<Value>) -> Value {
    json!({
        "OrganisationId": org,
        "OrganisationName": format!("Banco {}", org),
        "AuthorisationServers": [{
            "CustomerFriendlyName": format!("Marca {}", org),
            "ApiResources": resources
        }]
    })
}

/// P1 exposes a loans resource, P2 a financings resource.
pub fn two_participant_directory() -> Vec<Value> {
    vec![
        participant(
            "p1",
            vec![resource("opendata-loans_personal-loans", &[LOANS_URL])],
        ),
        participant(
            "p2",
            vec![resource("opendata-financings_business-financings", &[FINANCINGS_URL])],
        ),
    ]
}

/// Counts events per level while installed as the thread's default subscriber.
#[derive(Clone, Default)]
pub struct LevelCounter {
    errors: Arc<AtomicUsize>,
    warnings: Arc<AtomicUsize>,
}

impl LevelCounter {
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level == Level::ERROR {
            self.errors.fetch_add(1, Ordering::SeqCst);
        } else if level == Level::WARN {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Install a counting subscriber for the current thread.
///
/// `#[tokio::test]` runs on a current-thread runtime, so events from the
/// code under test land on this subscriber while the guard is alive.
pub fn capture_levels() -> (LevelCounter, tracing::subscriber::DefaultGuard) {
    let counter = LevelCounter::default();
    let subscriber = Registry::default().with(counter.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (counter, guard)
}
