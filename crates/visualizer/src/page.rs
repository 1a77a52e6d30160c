use std::sync::Arc;

use shared::{domain::ElementId, error::HostException};

use crate::document::Document;

/// Handles into the page built by [`algorithm_page`].
pub struct AlgorithmPage {
    pub document: Arc<Document>,
    pub insert_field: ElementId,
    pub delete_field: ElementId,
}

/// Builds the algorithm controls row the visualizer hangs off:
///
/// ```text
/// html > body > table > tr#AlgorithmSpecificControls > td > input[type=Text]
/// ```
///
/// The insert field comes first in document order, ahead of the delete field.
pub fn algorithm_page() -> Result<AlgorithmPage, HostException> {
    let document = Arc::new(Document::new());
    let body = document.create_element(document.root(), "body", &[])?;

    let general = document.create_element(body, "table", &[("id", "GeneralAnimationControls")])?;
    let general_row = document.create_element(general, "tr", &[])?;
    let speed_cell = document.create_element(general_row, "td", &[])?;
    document.create_element(speed_cell, "input", &[("type", "Text"), ("id", "AnimationSpeed")])?;

    let table = document.create_element(body, "table", &[])?;
    let row = document.create_element(table, "tr", &[("id", "AlgorithmSpecificControls")])?;

    let insert_cell = document.create_element(row, "td", &[])?;
    let insert_field = document.create_element(insert_cell, "input", &[("type", "Text")])?;
    let button_cell = document.create_element(row, "td", &[])?;
    document.create_element(
        button_cell,
        "input",
        &[("type", "Button"), ("value", "Insert")],
    )?;

    let delete_cell = document.create_element(row, "td", &[])?;
    let delete_field = document.create_element(delete_cell, "input", &[("type", "Text")])?;
    let delete_button_cell = document.create_element(row, "td", &[])?;
    document.create_element(
        delete_button_cell,
        "input",
        &[("type", "Button"), ("value", "Delete")],
    )?;

    Ok(AlgorithmPage {
        document,
        insert_field,
        delete_field,
    })
}
