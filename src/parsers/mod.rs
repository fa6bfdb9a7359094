pub mod scan_parser;
