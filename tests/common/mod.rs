//! Common test helpers shared across the integration tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use marc_stats::{Field, Record};

const FIELD_TERMINATOR: u8 = 0x1E;
const RECORD_TERMINATOR: u8 = 0x1D;
const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Builds an in-memory record using `tags` in order.
///
/// Tags starting with `00` become control fields.
pub fn record_with(tags: &[&str]) -> Record {
    let mut record = Record::new();
    for tag in tags {
        if tag.starts_with("00") {
            record.add_control_field_str(tag, "x");
        } else {
            let mut field = Field::new((*tag).to_string(), ' ', ' ');
            field.add_subfield_str('a', "value");
            record.add_field(field);
        }
    }
    record
}

/// One MARCXML `<record>` element using `tags` in order.
pub fn marcxml_record(tags: &[&str]) -> String {
    let mut xml = String::from("<record><leader>00000nam a2200000 a 4500</leader>");
    for tag in tags {
        if tag.starts_with("00") {
            xml.push_str(&format!(r#"<controlfield tag="{tag}">x</controlfield>"#));
        } else {
            xml.push_str(&format!(
                r#"<datafield tag="{tag}" ind1=" " ind2=" "><subfield code="a">value</subfield></datafield>"#
            ));
        }
    }
    xml.push_str("</record>");
    xml
}

/// A namespaced MARCXML collection holding one record per tag list.
pub fn marcxml_collection(records: &[&[&str]]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<collection xmlns="http://www.loc.gov/MARC21/slim">
"#,
    );
    for tags in records {
        xml.push_str(&marcxml_record(tags));
        xml.push('\n');
    }
    xml.push_str("</collection>\n");
    xml
}

/// One ISO 2709 record using `tags` in order.
pub fn iso2709_record(tags: &[&str]) -> Vec<u8> {
    let mut directory = Vec::new();
    let mut data = Vec::new();
    for tag in tags {
        let mut field = Vec::new();
        if tag.starts_with("00") {
            field.push(b'x');
        } else {
            field.extend_from_slice(b"  ");
            field.push(SUBFIELD_DELIMITER);
            field.extend_from_slice(b"avalue");
        }
        field.push(FIELD_TERMINATOR);
        directory.extend_from_slice(tag.as_bytes());
        directory.extend_from_slice(format!("{:04}{:05}", field.len(), data.len()).as_bytes());
        data.extend_from_slice(&field);
    }
    directory.push(FIELD_TERMINATOR);

    let base_address = 24 + directory.len();
    let record_length = base_address + data.len() + 1;
    let mut bytes = format!("{record_length:05}nam a22{base_address:05} a 4500").into_bytes();
    bytes.extend_from_slice(&directory);
    bytes.extend_from_slice(&data);
    bytes.push(RECORD_TERMINATOR);
    bytes
}

/// Writes `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, content).expect("write test file");
}

/// Writes `content` gzip-compressed to `path`.
pub fn write_gz(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    let mut encoder = GzEncoder::new(File::create(path).expect("create gz file"), Compression::default());
    encoder.write_all(content).expect("write gz content");
    encoder.finish().expect("finish gz stream");
}
