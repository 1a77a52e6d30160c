use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use anyhow::{Context, Result};
use rbtree::{InsertTrace, RbTree, TreeViolation};
use shared::domain::{ElementId, ListenerId};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::document::{Document, SignalContext};

#[derive(Default)]
struct ViewState {
    tree: RbTree<i64, ()>,
    /// Keys in the order they were submitted, duplicates included.
    inserted: Vec<i64>,
    animations_running: usize,
}

/// Red-black tree visualization bound to an input field.
///
/// An Enter key-down on the enabled field inserts its value, clears and
/// disables the field, then replays the balancing steps one `step_delay` at
/// a time before enabling the field again. Dropping the visualizer unbinds
/// it from the field.
pub struct TreeVisualizer {
    state: Arc<Mutex<ViewState>>,
    document: Weak<Document>,
    listener: ListenerId,
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TreeVisualizer {
    /// Must be called from inside a tokio runtime; animations run on it.
    pub fn install(document: &Arc<Document>, input: ElementId, step_delay: Duration) -> Result<Self> {
        let runtime = Handle::try_current().context("tree visualizer needs a tokio runtime")?;
        let state = Arc::new(Mutex::new(ViewState::default()));

        let weak = Arc::downgrade(document);
        let listener_state = state.clone();
        let listener = document
            .add_listener(
                input,
                Arc::new(move |ctx: &mut SignalContext| {
                    on_key_down(ctx, &weak, &listener_state, &runtime, step_delay);
                }),
            )
            .with_context(|| format!("failed to bind visualizer to element {}", input.0))?;

        info!(element = input.0, step_ms = step_delay.as_millis() as u64, "tree visualizer installed");
        Ok(Self {
            state,
            document: Arc::downgrade(document),
            listener,
        })
    }

    /// Tree keys in ascending order.
    pub fn snapshot(&self) -> Vec<i64> {
        lock(&self.state).tree.keys().copied().collect()
    }

    pub fn inserted(&self) -> Vec<i64> {
        lock(&self.state).inserted.clone()
    }

    pub fn render(&self) -> String {
        lock(&self.state).tree.render()
    }

    pub fn validate(&self) -> Result<usize, TreeViolation> {
        lock(&self.state).tree.validate()
    }

    pub fn is_animating(&self) -> bool {
        lock(&self.state).animations_running > 0
    }
}

impl Drop for TreeVisualizer {
    fn drop(&mut self) {
        if let Some(document) = self.document.upgrade() {
            document.remove_listener(self.listener);
        }
    }
}

fn on_key_down(
    ctx: &mut SignalContext,
    document: &Weak<Document>,
    state: &Arc<Mutex<ViewState>>,
    runtime: &Handle,
    step_delay: Duration,
) {
    if !ctx.signal().is_enter_key_down() {
        return;
    }
    let Some(document) = document.upgrade() else {
        return;
    };
    let input = ctx.current_target();

    // a disabled field swallows key presses
    match document.is_disabled(input) {
        Ok(false) => {}
        Ok(true) => {
            debug!(element = input.0, "insert ignored while animating");
            return;
        }
        Err(error) => {
            warn!(%error, "insert field vanished");
            return;
        }
    }

    let raw = document.value(input).unwrap_or_default();
    let Ok(key) = raw.trim().parse::<i64>() else {
        warn!(value = %raw, "ignoring non-numeric insert");
        return;
    };

    if let Err(error) = document
        .set_value(input, "")
        .and_then(|_| document.set_disabled(input, true))
    {
        warn!(%error, "failed to lock insert field");
        return;
    }

    let trace = {
        let mut state = lock(state);
        state.inserted.push(key);
        state.animations_running += 1;
        state.tree.insert_traced(key, ())
    };
    info!(
        key,
        inserted = trace.inserted,
        steps = trace.steps.len(),
        "animating insert"
    );

    runtime.spawn(animate(document, input, state.clone(), trace, step_delay));
}

async fn animate(
    document: Arc<Document>,
    input: ElementId,
    state: Arc<Mutex<ViewState>>,
    trace: InsertTrace<i64>,
    step_delay: Duration,
) {
    // placement (or the lookup of an existing key) is shown first
    tokio::time::sleep(step_delay).await;
    for step in &trace.steps {
        debug!(kind = ?step.kind, key = step.key, "balance step");
        tokio::time::sleep(step_delay).await;
    }

    lock(&state).animations_running -= 1;
    if let Err(error) = document.set_disabled(input, false) {
        warn!(%error, "failed to re-enable insert field");
    }
}

#[cfg(test)]
#[path = "tests/tree_view_tests.rs"]
mod tests;
