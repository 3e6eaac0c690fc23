use crate::models::CellValue;

/// Returns true when a table row is header/footer noise rather than data.
///
/// A row is noise if any text cell contains one of `keywords`
/// (case-insensitive), or if any cell could not be decoded at all.
/// Keywords are expected in lower case.
pub fn is_noise_row<S: AsRef<str>>(row: &[CellValue], keywords: &[S]) -> bool {
    row.iter().any(|cell| match cell {
        CellValue::Text(text) => {
            let lowered = text.to_lowercase();
            keywords.iter().any(|k| lowered.contains(k.as_ref()))
        }
        CellValue::Empty => false,
        CellValue::Unrepresentable => true,
    })
}
