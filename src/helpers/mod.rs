pub mod layout;
pub mod normalize;
pub mod pdf;
pub mod row_filter;
pub mod spreadsheet;
