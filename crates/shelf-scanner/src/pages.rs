//! Page count extraction for PDF scores.
//!
//! Extraction is deliberately isolated: a corrupt, truncated, or
//! encrypted file yields `None` and a warning, never an error. One bad
//! file in a library of thousands must not abort a scan or wedge the
//! watcher. Extraction also never runs while any catalog lock is held -
//! parsing a large PDF can take a while.

use camino::Utf8Path;
use lopdf::Document;
use tracing::{debug, warn};

/// Derives the page count of the PDF at `path`.
///
/// Returns `None` on any parse failure; the failure is logged, not
/// propagated.
///
/// # Examples
///
/// ```no_run
/// use shelf_scanner::extract_page_count;
/// use camino::Utf8Path;
///
/// let pages = extract_page_count(Utf8Path::new("/scores/a.pdf"));
/// assert!(pages.is_none() || pages.unwrap() > 0);
/// ```
#[must_use]
pub fn extract_page_count(path: &Utf8Path) -> Option<u32> {
    match Document::load(path.as_std_path()) {
        Ok(document) => {
            let pages = document.get_pages().len();
            debug!(path = %path, pages, "Extracted page count");
            u32::try_from(pages).ok()
        }
        Err(error) => {
            warn!(path = %path, error = %error, "Failed to extract page count");
            None
        }
    }
}

/// Writes a well-formed PDF with `page_count` empty pages.
///
/// Test fixture builder shared by the scanner and server test suites.
#[cfg(any(test, feature = "test-fixtures"))]
pub fn write_fixture_pdf(path: &Utf8Path, page_count: u32) {
    use lopdf::{Object, Stream, dictionary};

    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            let content_id = document.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_id.into()
        })
        .collect();

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(i64::from(page_count)),
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    document
        .save(path.as_std_path())
        .expect("failed to write fixture PDF");
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 root");
        (dir, root)
    }

    #[test]
    fn test_extract_page_count_valid_pdf() {
        let (_dir, root) = temp_root();
        let path = root.join("three.pdf");
        write_fixture_pdf(&path, 3);

        assert_eq!(extract_page_count(&path), Some(3));
    }

    #[test]
    fn test_extract_page_count_single_page() {
        let (_dir, root) = temp_root();
        let path = root.join("one.pdf");
        write_fixture_pdf(&path, 1);

        assert_eq!(extract_page_count(&path), Some(1));
    }

    #[test]
    fn test_extract_page_count_corrupt_file_is_none() {
        let (_dir, root) = temp_root();
        let path = root.join("broken.pdf");
        fs::write(&path, b"this is not a pdf at all").expect("write");

        assert_eq!(extract_page_count(&path), None);
    }

    #[test]
    fn test_extract_page_count_missing_file_is_none() {
        let (_dir, root) = temp_root();
        assert_eq!(extract_page_count(&root.join("missing.pdf")), None);
    }
}
