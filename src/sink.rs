//! Page-sink capability: the artifact encoder the assembler drives.
//!
//! The pipeline's contract with its output format is tiny — append pages in
//! ascending order, finalize once — so it lives behind the [`PageSink`]
//! trait. Tests record emission order without writing a PDF; alternative
//! encoders slot in without touching the pipeline.
//!
//! [`PdfSink`] is the shipped implementation: one PDF page per image, the
//! page's media box sized to the image's pixel dimensions, the image drawn
//! full-page as a `DeviceRGB` XObject.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

/// Errors raised by a page sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The artifact could not be encoded.
    #[error("failed to encode the output artifact: {0}")]
    Encode(String),
}

/// Something that can turn an ordered page sequence into artifact bytes.
pub trait PageSink {
    /// Append one page sized to the image's pixel dimensions.
    ///
    /// `pixels` is tightly packed RGB8, `width * height * 3` bytes.
    fn append_page(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<(), SinkError>;

    /// Consume the sink and produce the final artifact bytes.
    ///
    /// Called exactly once, only after every page appended without error.
    fn finalize(self) -> Result<Vec<u8>, SinkError>
    where
        Self: Sized;
}

/// PDF encoder: each appended page becomes one PDF page.
pub struct PdfSink {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    title: String,
}

impl PdfSink {
    /// Begin a new artifact with the given document title.
    pub fn new(title: impl Into<String>) -> Self {
        let mut doc = Document::with_version("1.5");
        // Reserved up front so every page can reference its parent.
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            title: title.into(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }
}

impl PageSink for PdfSink {
    fn append_page(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<(), SinkError> {
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(SinkError::Encode(format!(
                "pixel buffer is {} bytes, expected {} for {}x{} RGB8",
                pixels.len(),
                expected,
                width,
                height
            )));
        }

        let w = width as i64;
        let h = height as i64;

        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w,
                "Height" => h,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
            },
            pixels.to_vec(),
        );
        let image_id = self.doc.add_object(image);

        // Scale the unit-square image to fill the page.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        w.into(),
                        Object::Integer(0),
                        Object::Integer(0),
                        h.into(),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| SinkError::Encode(format!("content stream: {e}")))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let resources_id = self.doc.add_object(dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        });
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                w.into(),
                h.into(),
            ],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finalize(mut self) -> Result<Vec<u8>, SinkError> {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal(self.title.clone()),
        });
        self.doc.trailer.set("Info", info_id);

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_pixels(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        rgb.iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect()
    }

    #[test]
    fn two_pages_produce_a_two_page_pdf() {
        let mut sink = PdfSink::new("abc123");
        sink.append_page(1, 1, &solid_pixels(1, 1, [255, 0, 0]))
            .unwrap();
        sink.append_page(2, 3, &solid_pixels(2, 3, [0, 0, 255]))
            .unwrap();
        assert_eq!(sink.page_count(), 2);

        let bytes = sink.finalize().unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 2);
    }

    #[test]
    fn empty_artifact_is_still_a_pdf() {
        let sink = PdfSink::new("empty");
        let bytes = sink.finalize().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 0);
    }

    #[test]
    fn wrong_pixel_buffer_size_is_rejected() {
        let mut sink = PdfSink::new("bad");
        let err = sink.append_page(2, 2, &[0u8; 3]).unwrap_err();
        assert!(err.to_string().contains("expected 12"));
    }
}
