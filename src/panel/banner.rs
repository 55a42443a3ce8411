//! Notification Banner: the most recent pushed update as a single live message.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::labels::Labels;
use crate::types::LocationRecord;

/// One live announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    pub order_code: String,
    pub location_code: String,
    pub device_id: String,
    pub message: String,
    pub announced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationBanner {
    current: Option<Announcement>,
}

impl NotificationBanner {
    /// Replace the live message with one describing `record`.
    pub fn announce(&mut self, record: &LocationRecord, labels: &Labels) {
        self.current = Some(Announcement {
            order_code: record.order_code.clone(),
            location_code: record.location_code.clone(),
            device_id: record.device_id.clone(),
            message: labels.announcement(&record.order_code, &record.location_code),
            announced_at: Utc::now(),
        });
    }

    pub const fn current(&self) -> Option<&Announcement> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
