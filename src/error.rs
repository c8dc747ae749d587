use thiserror::Error;

/// Failures while measuring the caret through a mirror element.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("mirror element {0} is not attached to the document")]
    MissingElement(usize),
    #[error("layout failed: {0}")]
    Layout(String),
}

/// Failures surfaced by the controller API.
#[derive(Debug, Error)]
pub enum IntellisenseError {
    #[error("no text control registered under id `{0}`")]
    ControlNotFound(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
