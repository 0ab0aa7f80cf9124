//! Message text annotations.

use serde::{Deserialize, Serialize};

use crate::context::SuperinterfaceContext;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    FileCitation {
        text: String,
        file_citation: FileReference,
        #[serde(default)]
        start_index: usize,
        #[serde(default)]
        end_index: usize,
    },
    FilePath {
        text: String,
        file_path: FileReference,
        #[serde(default)]
        start_index: usize,
        #[serde(default)]
        end_index: usize,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReference {
    pub file_id: String,
}

/// How an annotation is presented next to the annotated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationView {
    /// A quote marker with a short label.
    Citation { label: &'static str },
    /// The annotated text links to a downloadable file.
    FileLink { text: String, href: String },
}

impl Annotation {
    /// Presentation for this annotation; `None` for types with no rendering.
    pub fn view(&self, context: &SuperinterfaceContext) -> Result<Option<AnnotationView>> {
        match self {
            Self::FileCitation { .. } => Ok(Some(AnnotationView::Citation {
                label: "File cited.",
            })),
            Self::FilePath {
                text, file_path, ..
            } => {
                let href = context.endpoint(&format!("/files/{}/contents", file_path.file_id))?;
                Ok(Some(AnnotationView::FileLink {
                    text: text.clone(),
                    href: href.to_string(),
                }))
            }
            Self::Unsupported => Ok(None),
        }
    }
}
