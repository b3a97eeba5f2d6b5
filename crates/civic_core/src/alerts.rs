//! Agent 4: public alert system.
//!
//! Turns a high-risk city-wide snapshot into a public alert, deduplicated by
//! title within the cooldown window, and simulates broadcasting alerts to
//! notification channels.

use std::sync::Arc;

use bevy::prelude::*;
use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::{ALERT_COOLDOWN_MS, ALL_WARDS, SIMULATED_RECIPIENTS};
use crate::store::CivicDataStore;
use crate::types::{Alert, RiskLevel, CHANNEL_APP, CHANNEL_SMS};

pub const HIGH_RISK_MESSAGE: &str =
    "Elevated risk detected due to recent weather and AQI levels. Please take necessary precautions.";

/// Simulated gateways deliver at once.
pub const DELIVERY_IMMEDIATE: &str = "Immediate";

pub fn high_risk_title(condition: &str) -> String {
    format!("⚠️ High Health Risk: {condition}")
}

/// Alert id from 16 bytes of the injected generator.
pub fn alert_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDelivery {
    pub channel: String,
    pub delivered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    /// True iff every requested channel delivered.
    pub success: bool,
    pub recipient_count: u64,
    pub delivery_time: String,
    pub deliveries: Vec<ChannelDelivery>,
}

pub struct PublicAlertSystem {
    store: Arc<CivicDataStore>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
    recipients: u64,
}

impl PublicAlertSystem {
    pub fn new(store: Arc<CivicDataStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            cooldown: Duration::milliseconds(ALERT_COOLDOWN_MS),
            recipients: SIMULATED_RECIPIENTS,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_recipients(mut self, recipients: u64) -> Self {
        self.recipients = recipients;
        self
    }

    /// Scan the city-wide forecast and snapshot. Returns the newly logged
    /// alert, or `None` when there is nothing to say or the same title was
    /// already raised inside the cooldown window.
    pub fn generate_alerts<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Alert> {
        info!("PublicAlertSystem: scanning for high-risk patterns");
        self.store.forecast(ALL_WARDS)?;
        let civic = self.store.civic_data(ALL_WARDS)?;
        if civic.risk_level != RiskLevel::High {
            return None;
        }

        let now = self.clock.now();
        let alert = Alert {
            id: alert_id(rng),
            title: high_risk_title(&civic.predicted_condition),
            message: HIGH_RISK_MESSAGE.to_string(),
            severity: RiskLevel::High,
            regions: vec![ALL_WARDS.to_string()],
            created_at: now,
            channels: vec![CHANNEL_SMS.to_string(), CHANNEL_APP.to_string()],
        };

        if !self
            .store
            .insert_alert_unless_recent(alert.clone(), now, self.cooldown)
        {
            debug!(
                "PublicAlertSystem: suppressed duplicate alert: {}",
                alert.title
            );
            return None;
        }
        info!("PublicAlertSystem: generated new alert: {}", alert.title);
        Some(alert)
    }

    /// Simulated dispatch to the notification gateways.
    pub fn broadcast_alert(&self, alert_id: &Uuid, channels: &[String]) -> BroadcastReceipt {
        if self.store.alert(alert_id).is_none() {
            warn!(
                "PublicAlertSystem: broadcasting alert {} which is not in the log",
                alert_id
            );
        }
        info!(
            "PublicAlertSystem: broadcasting alert {} via {}",
            alert_id,
            channels.join(", ")
        );

        let deliveries: Vec<ChannelDelivery> = channels
            .iter()
            .map(|channel| ChannelDelivery {
                channel: channel.clone(),
                delivered: true,
            })
            .collect();
        BroadcastReceipt {
            success: deliveries.iter().all(|d| d.delivered),
            recipient_count: self.recipients,
            delivery_time: DELIVERY_IMMEDIATE.to_string(),
            deliveries,
        }
    }
}
