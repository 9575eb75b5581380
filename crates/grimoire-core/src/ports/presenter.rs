//! Presenter implementations.

use std::collections::HashSet;
use std::sync::Mutex;

use super::Presenter;
use crate::overlay::VariantEntity;

/// Presenter that shows nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn render(&self, _variant: &VariantEntity) {}

    fn refresh(&self, _variant: &VariantEntity) {}

    fn is_rendered(&self, _variant: &VariantEntity) -> bool {
        false
    }
}

/// What a [`RecordingPresenter`] was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    Render(String),
    Refresh(String),
}

/// Presenter that remembers its calls and treats rendered sheets as open
///
/// Sheets are keyed by [`VariantEntity::sheet_key`].
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
    open: Mutex<HashSet<String>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(&self, call: PresenterCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Presenter for RecordingPresenter {
    fn render(&self, variant: &VariantEntity) {
        let key = variant.sheet_key();
        if let Ok(mut open) = self.open.lock() {
            open.insert(key.clone());
        }
        self.push(PresenterCall::Render(key));
    }

    fn refresh(&self, variant: &VariantEntity) {
        self.push(PresenterCall::Refresh(variant.sheet_key()));
    }

    fn is_rendered(&self, variant: &VariantEntity) -> bool {
        self.open
            .lock()
            .map(|open| open.contains(&variant.sheet_key()))
            .unwrap_or(false)
    }
}
