//! Unit-of-work listener capturing stderr for ICE detection.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::core::host::{UnitListener, UnitOutcome, WorkUnit};
use crate::core::settings::ReportIces;
use crate::ice::store::{IceReportStore, ReportFiles};

/// Buffers each unit's stderr while it runs and hands it to the store when
/// the unit completes. Buffers are discarded after completion.
pub struct IceListener {
    store: IceReportStore,
    enabled: bool,
    buffers: Mutex<HashMap<String, String>>,
    written: Mutex<Vec<ReportFiles>>,
}

impl IceListener {
    /// `report_property` is the value of the `reportICEs` property, if set.
    pub fn new(store: IceReportStore, mode: ReportIces, report_property: Option<&str>) -> Self {
        let enabled = mode.enabled(report_property);
        if !enabled {
            tracing::debug!("ICE reporting disabled ({})", mode);
        }
        IceListener {
            store,
            enabled,
            buffers: Mutex::new(HashMap::new()),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reports written so far.
    pub fn reports(&self) -> Vec<ReportFiles> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl UnitListener for IceListener {
    fn on_unit_start(&self, unit: &WorkUnit) {
        if !self.enabled {
            return;
        }
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(unit.path().to_string())
            .or_default();
    }

    fn on_unit_output(&self, unit: &WorkUnit, chunk: &str) {
        if !self.enabled {
            return;
        }
        let mut buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(buffer) = buffers.get_mut(unit.path()) {
            buffer.push_str(chunk);
        }
    }

    fn on_unit_complete(&self, unit: &WorkUnit, outcome: &UnitOutcome) {
        if !self.enabled {
            return;
        }
        let stderr = self
            .buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(unit.path())
            .unwrap_or_default();

        if let Some(files) = self.store.record_if_crash(unit, outcome, &stderr) {
            self.written
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(files);
        }
    }
}
