use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::BytesRef;

pub mod docx;
pub mod pdf;
pub mod pptx;
pub mod text;
pub mod xlsx;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use text::TextExtractor;
pub use xlsx::XlsxExtractor;

/// Appends the character an XML reference stands for. Unknown named
/// entities are kept as written.
fn push_reference(out: &mut String, reference: &BytesRef<'_>) -> Result<(), String> {
    if let Some(ch) = reference.resolve_char_ref().map_err(|e| e.to_string())? {
        out.push(ch);
        return Ok(());
    }

    let name = reference.decode().map_err(|e| e.to_string())?;
    match resolve_predefined_entity(&name) {
        Some(value) => out.push_str(value),
        None => {
            out.push('&');
            out.push_str(&name);
            out.push(';');
        }
    }
    Ok(())
}
