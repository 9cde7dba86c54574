pub mod byte_cursor;
pub mod event_parser;
pub mod file_parser;
pub mod note_assembler;
pub mod primitive_parser;
pub mod smf_types;
pub mod track_parser;
