//! Transcript export
//!
//! Renders a conversation into a PDF: for each exchange a bold `User:`
//! paragraph, a bold `Bot:` paragraph, the attached image at a fixed
//! two-inch square and a blank line. Images are encoded in memory. The
//! same exchanges always produce the same bytes.

mod font;
mod layout;
mod pdf;

use thiserror::Error;

use crate::bitmap::BitmapError;
use crate::store::Exchange;
use pdf::EncodedImage;

/// Suggested download name
pub const FILE_NAME: &str = "conversation_history.pdf";
pub const CONTENT_TYPE: &str = "application/pdf";

const DOCUMENT_TITLE: &str = "PicTalk conversation";

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Failed to encode image of exchange {index}: {source}")]
    Image {
        index: usize,
        #[source]
        source: BitmapError,
    },
}

/// Render `exchanges` as PDF bytes. An empty slice yields a valid,
/// single blank page document.
pub fn render_pdf(exchanges: &[Exchange]) -> Result<Vec<u8>, TranscriptError> {
    let images = exchanges
        .iter()
        .enumerate()
        .map(|(index, exchange)| {
            exchange
                .image()
                .map(|bitmap| {
                    bitmap
                        .to_jpeg()
                        .map(|jpeg| EncodedImage {
                            jpeg,
                            width: bitmap.width(),
                            height: bitmap.height(),
                        })
                        .map_err(|source| TranscriptError::Image { index, source })
                })
                .transpose()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pages = layout::layout(exchanges);
    tracing::debug!(
        exchanges = exchanges.len(),
        images = images.iter().flatten().count(),
        pages = pages.len(),
        "Rendering transcript"
    );

    Ok(pdf::write(&pages, &images, DOCUMENT_TITLE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn photo() -> Bitmap {
        Bitmap::from_rgb(2, 2, vec![200; 12]).unwrap()
    }

    #[test]
    fn two_exchanges_one_image() {
        let exchanges = vec![
            Exchange::new("What is in this picture?", "A grey square.", Some(photo())),
            Exchange::new("Thanks", "You're welcome.", None),
        ];
        let bytes = render_pdf(&exchanges).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(count(&bytes, b"(User:)"), 2);
        assert_eq!(count(&bytes, b"(Bot:)"), 2);
        assert_eq!(count(&bytes, b"/Subtype /Image"), 1);
        assert_eq!(count(&bytes, b"/DCTDecode"), 1);
    }

    #[test]
    fn empty_transcript_is_well_formed() {
        let bytes = render_pdf(&[]).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(count(&bytes, b"%%EOF"), 1);
        assert_eq!(count(&bytes, b"/Count 1"), 1);
        assert_eq!(count(&bytes, b"(User:)"), 0);
        assert_eq!(count(&bytes, b"/Subtype /Image"), 0);
    }

    #[test]
    fn output_is_deterministic() {
        let exchanges = vec![Exchange::new("q", "a", Some(photo()))];
        assert_eq!(render_pdf(&exchanges).unwrap(), render_pdf(&exchanges).unwrap());
    }

    #[test]
    fn markup_in_text_is_drawn_literally() {
        let exchanges = vec![Exchange::new("<b>bold?</b>", "<br />", None)];
        let bytes = render_pdf(&exchanges).unwrap();
        assert_eq!(count(&bytes, b"<b>bold?</b>"), 1);
        assert_eq!(count(&bytes, b"<br />"), 1);
    }

    #[test]
    fn long_conversations_span_pages() {
        let exchanges: Vec<Exchange> = (0..60)
            .map(|i| Exchange::new(format!("question {i}"), "answer ".repeat(40), None))
            .collect();
        let bytes = render_pdf(&exchanges).unwrap();
        assert_eq!(count(&bytes, b"(User:)"), 60);
        let pages = count(&bytes, b"/Type /Page") - count(&bytes, b"/Type /Pages");
        assert!(pages > 1);
    }
}
