use serde::Serialize;

use crate::{CollectionRequest, CollectionStatus, Record, WasteRequest, WasteRequestStatus};

pub fn count_with_status<R: Record>(records: &[R], status: R::Status) -> usize {
    records.iter().filter(|r| r.status() == status).count()
}

/// Dashboard counters for an industry user.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionCounts {
    pub pending: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub canceled: usize,
}

impl CollectionCounts {
    pub fn from_records(records: &[CollectionRequest]) -> Self {
        CollectionCounts {
            pending: count_with_status(records, CollectionStatus::Pending),
            scheduled: count_with_status(records, CollectionStatus::Scheduled),
            completed: count_with_status(records, CollectionStatus::Completed),
            canceled: count_with_status(records, CollectionStatus::Canceled),
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.scheduled + self.completed + self.canceled
    }
}

/// Dashboard counters for a public user.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WasteRequestCounts {
    pub pending: usize,
    pub approved: usize,
    pub delivered: usize,
    pub canceled: usize,
}

impl WasteRequestCounts {
    pub fn from_records(records: &[WasteRequest]) -> Self {
        WasteRequestCounts {
            pending: count_with_status(records, WasteRequestStatus::Pending),
            approved: count_with_status(records, WasteRequestStatus::Approved),
            delivered: count_with_status(records, WasteRequestStatus::Delivered),
            canceled: count_with_status(records, WasteRequestStatus::Canceled),
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.delivered + self.canceled
    }
}
