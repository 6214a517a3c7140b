use crate::error::LoadError;
use crate::models::PageText;
use lopdf::Document;
use std::path::Path;

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, LoadError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    // Blank pages are dropped; a document with no text at all is an error.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, LoadError> {
        let document = Document::load(path).map_err(pdf_error)?;

        let pages = document
            .get_pages()
            .into_keys()
            .map(|number| {
                document
                    .extract_text(&[number])
                    .map(|text| PageText { number, text })
                    .map_err(pdf_error)
            })
            .filter(|page| page.as_ref().map_or(true, |page| !page.text.trim().is_empty()))
            .collect::<Result<Vec<_>, _>>()?;

        if pages.is_empty() {
            return Err(LoadError::PdfParse(format!(
                "{} contains no extractable text",
                path.display()
            )));
        }

        Ok(pages)
    }
}

fn pdf_error(error: lopdf::Error) -> LoadError {
    LoadError::PdfParse(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::{LopdfExtractor, PdfExtractor};
    use crate::LoadError;
    use tempfile::tempdir;

    #[test]
    fn broken_pdf_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%broken")?;

        let result = LopdfExtractor.extract_pages(&path);
        assert!(matches!(result, Err(LoadError::PdfParse(_))));
        Ok(())
    }

    #[test]
    fn missing_pdf_is_reported() {
        let result = LopdfExtractor.extract_pages(std::path::Path::new("/nonexistent/absent.pdf"));
        assert!(result.is_err());
    }
}
