pub mod module_import;
pub mod question_converter;
pub mod row_normalizer;
pub mod sheet_reader;

pub use module_import::{import_module, ImportedModule};
pub use question_converter::convert_to_question;
pub use row_normalizer::{get_field, normalize_key, parse_sheet, ParsedSheet};
pub use sheet_reader::{read_sheet, Sheet};
