//! Scripted device picker.

use crate::{
    Result,
    traits::DevicePicker,
    types::{DeviceSummary, Selection},
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct PickerState {
    script: VecDeque<Selection>,
    fallback: Selection,
    offered: Vec<Vec<DeviceSummary>>,
    delay: Duration,
}

/// Device picker answering from a script instead of asking an operator.
///
/// Scripted answers are used in order; once exhausted the fallback answer is
/// repeated. Clones share state.
///
/// # Examples
///
/// ```
/// use impterm_ble::mock::ScriptedPicker;
/// use impterm_ble::traits::DevicePicker;
/// use impterm_ble::types::{DeviceSummary, Selection};
///
/// #[tokio::main]
/// async fn main() -> impterm_ble::Result<()> {
///     let picker = ScriptedPicker::sequence([Selection::Device(1)]);
///     let candidates = [DeviceSummary::new("AA:01"), DeviceSummary::new("AA:02")];
///
///     assert_eq!(picker.choose(&candidates).await?, Selection::Device(1));
///     assert_eq!(picker.choose(&candidates).await?, Selection::Cancelled);
///     assert_eq!(picker.calls(), 2);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedPicker {
    state: Arc<Mutex<PickerState>>,
}

impl ScriptedPicker {
    /// Answer every prompt with `selection`.
    pub fn always(selection: Selection) -> Self {
        Self::scripted(VecDeque::new(), selection)
    }

    /// Always pick the candidate at `index`.
    pub fn select(index: usize) -> Self {
        Self::always(Selection::Device(index))
    }

    /// Always dismiss the prompt.
    pub fn cancel() -> Self {
        Self::always(Selection::Cancelled)
    }

    /// Answer with `selections` in order, then cancel.
    pub fn sequence(selections: impl IntoIterator<Item = Selection>) -> Self {
        Self::scripted(selections.into_iter().collect(), Selection::Cancelled)
    }

    fn scripted(script: VecDeque<Selection>, fallback: Selection) -> Self {
        Self {
            state: Arc::new(Mutex::new(PickerState {
                script,
                fallback,
                offered: Vec::new(),
                delay: Duration::ZERO,
            })),
        }
    }

    /// Take `delay` to answer, like an operator reading the list.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.lock().delay = delay;
        self
    }

    /// Number of prompts shown.
    pub fn calls(&self) -> usize {
        self.lock().offered.len()
    }

    /// Candidate lists offered so far, oldest first.
    pub fn offered(&self) -> Vec<Vec<DeviceSummary>> {
        self.lock().offered.clone()
    }

    fn lock(&self) -> MutexGuard<'_, PickerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DevicePicker for ScriptedPicker {
    async fn choose(&self, candidates: &[DeviceSummary]) -> Result<Selection> {
        let (selection, delay) = {
            let mut state = self.lock();
            state.offered.push(candidates.to_vec());
            let selection = state.script.pop_front().unwrap_or(state.fallback);
            (selection, state.delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_repeats() {
        let picker = ScriptedPicker::select(0);
        let candidates = [DeviceSummary::new("AA:01")];

        for _ in 0..3 {
            assert_eq!(
                picker.choose(&candidates).await.unwrap(),
                Selection::Device(0)
            );
        }
        assert_eq!(picker.calls(), 3);
    }

    #[tokio::test]
    async fn test_records_offered_candidates() {
        let picker = ScriptedPicker::cancel();
        let candidates = [DeviceSummary::new("AA:01").with_name("IMP Terminal")];

        assert_eq!(
            picker.choose(&candidates).await.unwrap(),
            Selection::Cancelled
        );
        assert_eq!(picker.offered(), vec![candidates.to_vec()]);
    }
}
