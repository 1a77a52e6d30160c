//! In-process host page: an element tree with input state and signal dispatch.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::{
    domain::{ElementId, ListenerId},
    error::{ErrorCode, HostException},
    protocol::{DispatchOutcome, SubmitSignal},
};
use tracing::trace;

use crate::selector::Selector;

pub type Listener = Arc<dyn Fn(&mut SignalContext) + Send + Sync>;

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    value: String,
    disabled: bool,
}

#[derive(Default)]
struct DocumentInner {
    elements: Vec<Element>,
    listeners: Vec<(ListenerId, ElementId, Listener)>,
    next_listener: usize,
}

impl DocumentInner {
    fn element(&self, id: ElementId) -> Result<&Element, HostException> {
        self.elements.get(id.0).ok_or_else(|| detached(id))
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, HostException> {
        self.elements.get_mut(id.0).ok_or_else(|| detached(id))
    }
}

fn detached(id: ElementId) -> HostException {
    HostException::new(
        ErrorCode::Detached,
        format!("element {} is not part of the document", id.0),
    )
}

/// State handed to each listener while a signal travels up the tree.
pub struct SignalContext {
    signal: SubmitSignal,
    target: ElementId,
    current: ElementId,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl SignalContext {
    pub fn signal(&self) -> &SubmitSignal {
        &self.signal
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn current_target(&self) -> ElementId {
        self.current
    }

    /// Has no effect on signals that are not cancelable.
    pub fn prevent_default(&mut self) {
        if self.signal.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub struct Document {
    inner: Mutex<DocumentInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding only the `html` root element.
    pub fn new() -> Self {
        let root = Element {
            tag: "html".into(),
            attributes: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            value: String::new(),
            disabled: false,
        };
        Self {
            inner: Mutex::new(DocumentInner {
                elements: vec![root],
                ..DocumentInner::default()
            }),
        }
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    fn lock(&self) -> MutexGuard<'_, DocumentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_element(
        &self,
        parent: ElementId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<ElementId, HostException> {
        let mut inner = self.lock();
        inner.element(parent)?;

        let id = ElementId(inner.elements.len());
        let attributes: BTreeMap<String, String> = attributes
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
            .collect();
        let value = attributes.get("value").cloned().unwrap_or_default();
        inner.elements.push(Element {
            tag: tag.to_ascii_lowercase(),
            attributes,
            parent: Some(parent),
            children: Vec::new(),
            value,
            disabled: false,
        });
        inner.element_mut(parent)?.children.push(id);
        Ok(id)
    }

    pub fn tag(&self, id: ElementId) -> Result<String, HostException> {
        Ok(self.lock().element(id)?.tag.clone())
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Result<Option<String>, HostException> {
        let inner = self.lock();
        Ok(inner
            .element(id)?
            .attributes
            .get(&name.to_ascii_lowercase())
            .cloned())
    }

    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>, HostException> {
        Ok(self.lock().element(id)?.parent)
    }

    pub fn value(&self, id: ElementId) -> Result<String, HostException> {
        Ok(self.lock().element(id)?.value.clone())
    }

    pub fn set_value(&self, id: ElementId, value: &str) -> Result<(), HostException> {
        self.lock().element_mut(id)?.value = value.to_string();
        Ok(())
    }

    pub fn is_disabled(&self, id: ElementId) -> Result<bool, HostException> {
        Ok(self.lock().element(id)?.disabled)
    }

    pub fn set_disabled(&self, id: ElementId, disabled: bool) -> Result<(), HostException> {
        self.lock().element_mut(id)?.disabled = disabled;
        Ok(())
    }

    /// First element in document order matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, HostException> {
        let selector = Selector::parse(selector)?;
        let inner = self.lock();

        let mut pending = vec![self.root()];
        while let Some(id) = pending.pop() {
            let element = inner.element(id)?;
            if selector.matches(id, &|candidate| view(&inner, candidate)) {
                return Ok(Some(id));
            }
            pending.extend(element.children.iter().rev().copied());
        }
        Ok(None)
    }

    pub fn add_listener(
        &self,
        id: ElementId,
        listener: Listener,
    ) -> Result<ListenerId, HostException> {
        let mut inner = self.lock();
        inner.element(id)?;
        let listener_id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((listener_id, id, listener));
        Ok(listener_id)
    }

    pub fn remove_listener(&self, listener: ListenerId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(id, _, _)| *id != listener);
        inner.listeners.len() != before
    }

    /// Delivers `signal` to `target`, then to each ancestor when it bubbles.
    ///
    /// Listeners are collected up front and run without the document lock,
    /// so they may read and mutate the document freely.
    pub fn dispatch(
        &self,
        target: ElementId,
        signal: SubmitSignal,
    ) -> Result<DispatchOutcome, HostException> {
        let path = {
            let inner = self.lock();
            let mut path = Vec::new();
            let mut current = Some(target);
            while let Some(id) = current {
                let listeners: Vec<Listener> = inner
                    .listeners
                    .iter()
                    .filter(|(_, element, _)| *element == id)
                    .map(|(_, _, listener)| listener.clone())
                    .collect();
                path.push((id, listeners));
                current = if signal.bubbles {
                    inner.element(id)?.parent
                } else {
                    // still validates the target
                    inner.element(id)?;
                    None
                };
            }
            path
        };

        let mut ctx = SignalContext {
            signal,
            target,
            current: target,
            default_prevented: false,
            propagation_stopped: false,
        };
        for (id, listeners) in path {
            ctx.current = id;
            for listener in listeners {
                listener(&mut ctx);
            }
            if ctx.propagation_stopped {
                trace!(element = id.0, "signal propagation stopped");
                break;
            }
        }

        Ok(if ctx.default_prevented {
            DispatchOutcome::Canceled
        } else {
            DispatchOutcome::Delivered
        })
    }
}

/// Borrowed element facts the selector matcher needs.
pub(crate) struct ElementView<'a> {
    pub tag: &'a str,
    pub attributes: &'a BTreeMap<String, String>,
    pub parent: Option<ElementId>,
}

fn view(inner: &DocumentInner, id: ElementId) -> Option<ElementView<'_>> {
    inner.elements.get(id.0).map(|element| ElementView {
        tag: &element.tag,
        attributes: &element.attributes,
        parent: element.parent,
    })
}
