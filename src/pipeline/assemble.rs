//! Order-restoring assembly: decode each fetched page and drive the sink.
//!
//! This is the pipeline's core ordering guarantee: network completion order
//! is unconstrained, emitted page order is always ascending page index. The
//! sink is finalized exactly once, only after every page appended cleanly.
//!
//! Decoding is CPU-bound; the orchestrator runs this stage inside
//! `spawn_blocking` so it never stalls the async scheduler.

use crate::error::DocsendError;
use crate::session::PageImage;
use crate::sink::PageSink;
use tracing::debug;

/// Decode every page and emit them into `sink` in index order.
///
/// Returns the finalized artifact bytes.
pub fn assemble<S: PageSink>(
    mut pages: Vec<PageImage>,
    mut sink: S,
) -> Result<Vec<u8>, DocsendError> {
    pages.sort_unstable_by_key(|page| page.page);

    for page in &pages {
        let (width, height, pixels) = decode(page)?;
        sink.append_page(width, height, &pixels)?;
        debug!("Appended page {} ({}x{})", page.page, width, height);
    }

    Ok(sink.finalize()?)
}

/// Decode one page's raw bytes into pixel dimensions and RGB8 content.
fn decode(page: &PageImage) -> Result<(u32, u32, Vec<u8>), DocsendError> {
    let image =
        image::load_from_memory(&page.bytes).map_err(|e| DocsendError::AssemblyFailed {
            page: page.page,
            reason: e.to_string(),
        })?;
    let rgb = image.to_rgb8();
    Ok((rgb.width(), rgb.height(), rgb.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Test sink that records appended pixel payloads and whether it was
    /// finalized, through shared handles that outlive the sink.
    struct RecordingSink {
        appended: Arc<Mutex<Vec<(u32, u32, Vec<u8>)>>>,
        finalized: Arc<AtomicBool>,
    }

    impl PageSink for RecordingSink {
        fn append_page(
            &mut self,
            width: u32,
            height: u32,
            pixels: &[u8],
        ) -> Result<(), SinkError> {
            self.appended
                .lock()
                .unwrap()
                .push((width, height, pixels.to_vec()));
            Ok(())
        }

        fn finalize(self) -> Result<Vec<u8>, SinkError> {
            self.finalized.store(true, Ordering::SeqCst);
            Ok(b"artifact".to_vec())
        }
    }

    fn recording_sink() -> (RecordingSink, Arc<Mutex<Vec<(u32, u32, Vec<u8>)>>>, Arc<AtomicBool>)
    {
        let appended = Arc::new(Mutex::new(Vec::new()));
        let finalized = Arc::new(AtomicBool::new(false));
        let sink = RecordingSink {
            appended: Arc::clone(&appended),
            finalized: Arc::clone(&finalized),
        };
        (sink, appended, finalized)
    }

    fn png_pixel(rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb(rgb));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn pages_emit_in_index_order_regardless_of_arrival_order() {
        let pages = vec![
            PageImage {
                page: 3,
                bytes: png_pixel([3, 0, 0]),
            },
            PageImage {
                page: 1,
                bytes: png_pixel([1, 0, 0]),
            },
            PageImage {
                page: 2,
                bytes: png_pixel([2, 0, 0]),
            },
        ];

        let (sink, appended, finalized) = recording_sink();
        let artifact = assemble(pages, sink).unwrap();
        assert_eq!(artifact, b"artifact");
        assert!(finalized.load(Ordering::SeqCst));

        let emitted: Vec<u8> = appended
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, pixels)| pixels[0])
            .collect();
        assert_eq!(emitted, vec![1, 2, 3]);
    }

    #[test]
    fn decode_failure_names_the_page_and_skips_finalize() {
        let pages = vec![
            PageImage {
                page: 1,
                bytes: png_pixel([1, 0, 0]),
            },
            PageImage {
                page: 2,
                bytes: b"not an image".to_vec(),
            },
        ];

        let (sink, _, finalized) = recording_sink();
        let err = assemble(pages, sink).unwrap_err();
        assert!(matches!(err, DocsendError::AssemblyFailed { page: 2, .. }));
        assert!(!finalized.load(Ordering::SeqCst));
    }

    #[test]
    fn empty_page_set_finalizes_immediately() {
        let (sink, appended, finalized) = recording_sink();
        assemble(Vec::new(), sink).unwrap();
        assert!(appended.lock().unwrap().is_empty());
        assert!(finalized.load(Ordering::SeqCst));
    }
}
