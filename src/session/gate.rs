use std::sync::atomic::{AtomicBool, Ordering};

/// SubmitGate
///
/// The form's `loading` flag. A submission must hold a `SubmitGuard`; while one is alive,
/// further `try_begin` calls fail, so a double-clicked submit never issues a second request.
#[derive(Debug, Default)]
pub struct SubmitGate {
    loading: AtomicBool,
}

impl SubmitGate {
    pub fn try_begin(&self) -> Option<SubmitGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard { gate: self })
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }
}

/// Clears the gate when the submission finishes, however it finishes.
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    gate: &'a SubmitGate,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.gate.loading.store(false, Ordering::Release);
    }
}
