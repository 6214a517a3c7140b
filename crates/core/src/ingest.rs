use crate::chunking::{RecursiveSplitter, TextNormalizer};
use crate::extractor::PdfExtractor;
use crate::models::{Chunk, ChunkingOptions, PageText, SkippedPdf};
use crate::tokenizer::TokenCounter;
use crate::LoadError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub struct LoadReport {
    pub documents: Vec<String>,
    pub chunks: Vec<Chunk>,
    pub skipped_files: Vec<SkippedPdf>,
}

pub fn load_and_chunk(
    folder: &Path,
    extractor: &dyn PdfExtractor,
    counter: &dyn TokenCounter,
    options: &ChunkingOptions,
) -> Result<LoadReport, LoadError> {
    let splitter = RecursiveSplitter::new(options, counter)?;
    let normalizer = TextNormalizer::new()?;
    let files = discover_pdf_files(folder);

    if files.is_empty() {
        return Err(LoadError::NoPdfFiles(folder.display().to_string()));
    }

    let mut documents = Vec::new();
    let mut chunks = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        let loaded = document_name(&path).and_then(|name| {
            let pages = extractor.extract_pages(&path)?;
            Ok((name, pages))
        });

        match loaded {
            Ok((name, pages)) => {
                let before = chunks.len();
                chunk_pages(&name, &pages, &normalizer, &splitter, counter, &mut chunks);
                debug!(document = %name, pages = pages.len(), chunks = chunks.len() - before, "document chunked");
                documents.push(name);
            }
            Err(error) => {
                warn!(path = %path.display(), reason = %error, "skipping unreadable pdf");
                skipped_files.push(SkippedPdf {
                    path: path.to_string_lossy().to_string(),
                    reason: error.to_string(),
                });
            }
        }
    }

    Ok(LoadReport {
        documents,
        chunks,
        skipped_files,
    })
}

fn chunk_pages(
    document: &str,
    pages: &[PageText],
    normalizer: &TextNormalizer,
    splitter: &RecursiveSplitter<'_>,
    counter: &dyn TokenCounter,
    target: &mut Vec<Chunk>,
) {
    for page in pages {
        let normalized = normalizer.normalize(&page.text);
        for text in splitter.split(&normalized) {
            target.push(Chunk {
                document: document.to_string(),
                page: page.number,
                index: target.len(),
                token_count: counter.count_tokens(&text),
                text,
            });
        }
    }
}

fn document_name(path: &Path) -> Result<String, LoadError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| LoadError::MissingFileName(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::{discover_pdf_files, load_and_chunk};
    use crate::extractor::{LopdfExtractor, PdfExtractor};
    use crate::models::PageText;
    use crate::models::ChunkingOptions;
    use crate::tokenizer::ApproxTokenCounter;
    use crate::LoadError;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    struct FakeExtractor;

    impl PdfExtractor for FakeExtractor {
        fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, LoadError> {
            match path.file_name().and_then(|name| name.to_str()) {
                Some("broken.pdf") => Err(LoadError::PdfParse("fake failure".to_string())),
                Some(name) => Ok(vec![
                    PageText {
                        number: 1,
                        text: format!("Catalogo   de {name}\n\n atendido por la Dra. Vega"),
                    },
                    PageText {
                        number: 2,
                        text: "Politica de devoluciones: treinta dias.".to_string(),
                    },
                ]),
                None => Err(LoadError::MissingFileName(path.display().to_string())),
            }
        }
    }

    #[test]
    fn discovery_is_flat_sorted_and_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        fs::write(base.join("b.PDF"), b"%PDF-1.4\n%fake")?;
        fs::write(base.join("a.pdf"), b"%PDF-1.4\n%fake")?;
        fs::write(base.join("notes.txt"), b"not a pdf")?;
        fs::write(nested.join("c.pdf"), b"%PDF-1.4\n%fake")?;

        let files = discover_pdf_files(base);
        let names = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
        Ok(())
    }

    #[test]
    fn loading_fails_without_pdfs() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = load_and_chunk(
            dir.path(),
            &FakeExtractor,
            &ApproxTokenCounter,
            &ChunkingOptions::default(),
        );
        assert!(matches!(result, Err(LoadError::NoPdfFiles(_))));
        Ok(())
    }

    #[test]
    fn missing_folder_counts_as_empty() {
        let result = load_and_chunk(
            Path::new("/nonexistent/pdf-folder"),
            &FakeExtractor,
            &ApproxTokenCounter,
            &ChunkingOptions::default(),
        );
        assert!(matches!(result, Err(LoadError::NoPdfFiles(_))));
    }

    #[test]
    fn pages_are_normalized_and_chunked_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("b.pdf"), b"fake")?;
        fs::write(dir.path().join("a.pdf"), b"fake")?;

        let report = load_and_chunk(
            dir.path(),
            &FakeExtractor,
            &ApproxTokenCounter,
            &ChunkingOptions::default(),
        )?;

        assert_eq!(report.documents, vec!["a.pdf", "b.pdf"]);
        assert_eq!(report.chunks.len(), 4);
        assert!(report.skipped_files.is_empty());

        let first = &report.chunks[0];
        assert_eq!(first.document, "a.pdf");
        assert_eq!(first.page, 1);
        assert_eq!(first.text, "Catalogo de a.pdf atendido por la Doctora Vega");
        assert_eq!(first.token_count, 12);
        assert_eq!(report.chunks[1].page, 2);
        assert_eq!(report.chunks[2].document, "b.pdf");
        assert!(report
            .chunks
            .iter()
            .enumerate()
            .all(|(position, chunk)| chunk.index == position));
        Ok(())
    }

    #[test]
    fn unreadable_pdfs_are_skipped_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("broken.pdf"), b"fake")?;
        fs::write(dir.path().join("ok.pdf"), b"fake")?;

        let report = load_and_chunk(
            dir.path(),
            &FakeExtractor,
            &ApproxTokenCounter,
            &ChunkingOptions::default(),
        )?;

        assert_eq!(report.documents, vec!["ok.pdf"]);
        assert_eq!(report.skipped_files.len(), 1);
        assert!(report.skipped_files[0].path.ends_with("broken.pdf"));
        assert!(report.skipped_files[0].reason.contains("fake failure"));
        Ok(())
    }

    #[test]
    fn lopdf_extractor_skips_corrupt_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("unreadable.pdf"), b"%PDF-1.4\n%broken")?;

        let report = load_and_chunk(
            dir.path(),
            &LopdfExtractor,
            &ApproxTokenCounter,
            &ChunkingOptions::default(),
        )?;

        assert!(report.chunks.is_empty());
        assert_eq!(report.skipped_files.len(), 1);
        Ok(())
    }
}
