//! Direct PDF text-layer extraction.
//!
//! First of the two extraction strategies: pull the selectable text embedded
//! in the PDF without rendering anything. Scanned PDFs have no text layer and
//! malformed ones fail to parse; both cases yield an empty string here so the
//! orchestrator escalates to rasterize + OCR.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::debug;

/// Extract the trimmed text layer from PDF bytes.
///
/// Never fails: parse errors (and parser panics, which pdf-extract is known
/// to produce on exotic files) are treated as "no text".
pub fn extract_text_layer(bytes: &[u8]) -> String {
    let parsed = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

    match parsed {
        Ok(Ok(text)) => text.trim().to_string(),
        Ok(Err(e)) => {
            debug!(error = %e, "Direct text extraction failed");
            String::new()
        }
        Err(_) => {
            debug!("Direct text extraction panicked");
            String::new()
        }
    }
}
