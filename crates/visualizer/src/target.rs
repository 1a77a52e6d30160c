use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use insert_driver::{Target, TargetLocator};
use shared::{
    domain::ElementId,
    protocol::{DispatchOutcome, SubmitSignal},
};

use crate::document::Document;

/// An input element of a [`Document`] seen through the driver's [`Target`] seam.
pub struct InputTarget {
    document: Arc<Document>,
    element: ElementId,
}

impl InputTarget {
    pub fn new(document: Arc<Document>, element: ElementId) -> Self {
        Self { document, element }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }
}

#[async_trait]
impl Target for InputTarget {
    async fn set_value(&self, value: &str) -> Result<()> {
        self.document.set_value(self.element, value)?;
        Ok(())
    }

    async fn submit(&self, signal: SubmitSignal) -> Result<DispatchOutcome> {
        Ok(self.document.dispatch(self.element, signal)?)
    }

    async fn is_busy(&self) -> Result<bool> {
        Ok(self.document.is_disabled(self.element)?)
    }
}

pub struct DocumentLocator {
    document: Arc<Document>,
}

impl DocumentLocator {
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }
}

impl TargetLocator for DocumentLocator {
    fn locate(&self, selector: &str) -> Result<Option<Arc<dyn Target>>> {
        let found = self.document.query_selector(selector)?;
        Ok(found.map(|element| {
            Arc::new(InputTarget::new(self.document.clone(), element)) as Arc<dyn Target>
        }))
    }
}
