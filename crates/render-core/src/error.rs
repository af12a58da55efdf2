use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template not found: no snapshot was supplied")]
    TemplateNotFound,
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("document would need {pages} pages, limit is {limit}")]
    TooManyPages { pages: usize, limit: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::InvalidSnapshot(err.to_string())
    }
}
