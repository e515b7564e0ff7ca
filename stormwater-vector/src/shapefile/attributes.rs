/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT

NOTE: Structures and functions for handling the Shapefile attribute table info
contained with the associated .dbf file.
*/
use std::fmt;
use std::io::{Error, ErrorKind};

/// Longest field name a dBase descriptor can hold, in bytes.
pub const MAX_FIELD_NAME_LENGTH: usize = 10;
/// Widest character field a dBase table can hold, in bytes.
pub const MAX_TEXT_FIELD_LENGTH: usize = 254;

#[derive(Debug, Default, Clone)]
pub struct AttributeHeader {
    pub version: u8,
    pub year: u32,
    pub month: u8,
    pub day: u8,
    pub num_records: u32,
    pub num_fields: u32, // not actually stored in file but derived
    pub bytes_in_header: u16,
    pub bytes_in_record: u16,
    pub incomplete_transaction: u8,
    pub encryption_flag: u8,
    pub mdx_flag: u8,
    pub language_driver_id: u8,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DateData {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for DateData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Int(i32),
    Int64(i64),
    Real(f64),
    Text(String),
    Date(DateData),
    Bool(bool),
    Null,
}

impl FieldData {
    pub fn is_null(&self) -> bool {
        *self == FieldData::Null
    }

    /// Numeric view of the value. Text is accepted when it parses as a number,
    /// since numeric columns are often exported as text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldData::Int(v) => Some(*v as f64),
            FieldData::Int64(v) => Some(*v as f64),
            FieldData::Real(v) => Some(*v),
            FieldData::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// String view of the value; `None` for Null.
    pub fn as_string(&self) -> Option<String> {
        match self {
            FieldData::Null => None,
            _ => Some(self.to_string()),
        }
    }
}

impl fmt::Display for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldData::Int(v) => write!(f, "{}", v),
            FieldData::Int64(v) => write!(f, "{}", v),
            FieldData::Real(v) => write!(f, "{}", v),
            FieldData::Text(v) => write!(f, "{}", v),
            FieldData::Date(v) => write!(f, "{}", v),
            FieldData::Bool(v) => write!(f, "{}", if *v { "T" } else { "F" }),
            FieldData::Null => Ok(()),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FieldDataType {
    Int,
    Real,
    Text,
    Date,
    Bool,
}

impl FieldDataType {
    /// The dBase type code.
    pub fn to_char(&self) -> char {
        match self {
            FieldDataType::Int | FieldDataType::Real => 'N',
            FieldDataType::Text => 'C',
            FieldDataType::Date => 'D',
            FieldDataType::Bool => 'L',
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeField {
    pub name: String,
    pub field_type: char,
    pub field_length: u8,
    pub decimal_count: u8,
}

impl AttributeField {
    pub fn new(
        name: &str,
        field_type: FieldDataType,
        field_length: u8,
        decimal_count: u8,
    ) -> AttributeField {
        AttributeField {
            name: name.to_string(),
            field_type: field_type.to_char(),
            field_length,
            decimal_count,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.field_type, 'N' | 'F' | 'I' | 'O')
    }

    /// Parses the raw, space-padded contents of a dBase cell.
    pub fn parse_value(&self, raw: &str) -> FieldData {
        let s = raw.replace(char::from(0), "");
        let s = s.trim();
        if s.replace('?', "").is_empty() {
            return FieldData::Null;
        }
        match self.field_type {
            'N' | 'F' | 'I' | 'O' => {
                if self.decimal_count == 0 {
                    if let Ok(v) = s.parse::<i32>() {
                        return FieldData::Int(v);
                    }
                    if let Ok(v) = s.parse::<i64>() {
                        return FieldData::Int64(v);
                    }
                }
                match s.parse::<f64>() {
                    Ok(v) => FieldData::Real(v),
                    Err(_) => FieldData::Text(s.to_string()),
                }
            }
            'D' => {
                if s.len() == 8 && s.is_char_boundary(4) && s.is_char_boundary(6) {
                    match (
                        s[0..4].parse::<u16>(),
                        s[4..6].parse::<u8>(),
                        s[6..8].parse::<u8>(),
                    ) {
                        (Ok(year), Ok(month), Ok(day)) => {
                            FieldData::Date(DateData { year, month, day })
                        }
                        _ => FieldData::Null,
                    }
                } else {
                    FieldData::Null
                }
            }
            'L' => match s.to_lowercase().as_str() {
                "t" | "y" => FieldData::Bool(true),
                "f" | "n" => FieldData::Bool(false),
                _ => FieldData::Null,
            },
            _ => FieldData::Text(s.to_string()),
        }
    }

    /// Encodes a value into exactly `field_length` bytes. Numbers are right
    /// aligned, everything else left aligned. A number that does not fit the
    /// field is an error; text is truncated at a character boundary.
    pub fn format_value(&self, value: &FieldData) -> Result<Vec<u8>, Error> {
        let width = self.field_length as usize;
        let s = match value {
            FieldData::Null => String::new(),
            FieldData::Real(v) if self.is_numeric() => {
                format!("{:.*}", self.decimal_count as usize, v)
            }
            _ => value.to_string(),
        };
        let mut bytes = if s.len() > width {
            if self.is_numeric() && !value.is_null() {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!(
                        "Value {} is too wide for the {}-byte field '{}'.",
                        s, width, self.name
                    ),
                ));
            }
            let mut end = width;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            s[..end].as_bytes().to_vec()
        } else {
            s.into_bytes()
        };
        let padding = vec![b' '; width - bytes.len()];
        if self.is_numeric() {
            let mut padded = padding;
            padded.append(&mut bytes);
            Ok(padded)
        } else {
            bytes.extend_from_slice(&padding);
            Ok(bytes)
        }
    }
}

/// The attribute table of a Shapefile. Each record holds one value per field.
#[derive(Debug, Default, Clone)]
pub struct ShapefileAttributes {
    pub header: AttributeHeader,
    pub fields: Vec<AttributeField>,
    data: Vec<Vec<FieldData>>,
    pub is_deleted: Vec<bool>,
}

impl ShapefileAttributes {
    pub fn num_records(&self) -> usize {
        self.data.len()
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Appends a field; existing records receive a Null value for it.
    pub fn add_field(&mut self, field: &AttributeField) {
        self.fields.push(field.clone());
        for rec in self.data.iter_mut() {
            rec.push(FieldData::Null);
        }
        self.header.num_fields = self.fields.len() as u32;
    }

    pub fn get_field(&self, index: usize) -> Option<&AttributeField> {
        self.fields.get(index)
    }

    /// Case-sensitive lookup of a field index by name.
    pub fn get_field_num(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn set_field_length(&mut self, index: usize, length: u8) -> Result<(), Error> {
        match self.fields.get_mut(index) {
            Some(field) => {
                field.field_length = length;
                Ok(())
            }
            None => Err(field_index_error(index)),
        }
    }

    /// Adds a record; short records are padded with Null values.
    pub fn add_record(&mut self, mut rec: Vec<FieldData>, deleted: bool) {
        rec.resize(self.fields.len(), FieldData::Null);
        self.data.push(rec);
        self.is_deleted.push(deleted);
        self.header.num_records = self.data.len() as u32;
    }

    pub fn get_record(&self, index: usize) -> Option<&[FieldData]> {
        self.data.get(index).map(|r| r.as_slice())
    }

    pub fn get_value(&self, record_index: usize, field_index: usize) -> Option<&FieldData> {
        self.data.get(record_index)?.get(field_index)
    }

    pub fn set_value(
        &mut self,
        record_index: usize,
        field_index: usize,
        value: FieldData,
    ) -> Result<(), Error> {
        if field_index >= self.fields.len() {
            return Err(field_index_error(field_index));
        }
        match self.data.get_mut(record_index) {
            Some(rec) => {
                rec[field_index] = value;
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Record {} does not exist.", record_index),
            )),
        }
    }
}

fn field_index_error(index: usize) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!("Field {} does not exist.", index),
    )
}

#[cfg(test)]
mod test {
    use super::{AttributeField, FieldData, FieldDataType, ShapefileAttributes};

    #[test]
    fn test_add_field_pads_existing_records() {
        let mut atts = ShapefileAttributes::default();
        atts.add_field(&AttributeField::new("AssetID", FieldDataType::Text, 12, 0));
        atts.add_record(vec![FieldData::Text("P1".to_string())], false);
        atts.add_field(&AttributeField::new("DEM value1", FieldDataType::Real, 12, 3));
        assert_eq!(atts.num_fields(), 2);
        assert_eq!(atts.get_value(0, 1), Some(&FieldData::Null));
        assert_eq!(atts.get_field_num("DEM value1"), Some(1));
        assert_eq!(atts.get_field_num("dem value1"), None);
    }

    #[test]
    fn test_set_value_bounds() {
        let mut atts = ShapefileAttributes::default();
        atts.add_field(&AttributeField::new("ID", FieldDataType::Int, 5, 0));
        atts.add_record(vec![], false);
        assert!(atts.set_value(0, 0, FieldData::Int(4)).is_ok());
        assert!(atts.set_value(1, 0, FieldData::Int(4)).is_err());
        assert!(atts.set_value(0, 1, FieldData::Int(4)).is_err());
        assert_eq!(atts.get_record(0), Some(&[FieldData::Int(4)][..]));
    }

    #[test]
    fn test_parse_value() {
        let num = AttributeField::new("N", FieldDataType::Real, 12, 3);
        assert_eq!(num.parse_value("      12.500"), FieldData::Real(12.5));
        assert_eq!(num.parse_value("            "), FieldData::Null);
        let int = AttributeField::new("I", FieldDataType::Int, 12, 0);
        assert_eq!(int.parse_value("        42"), FieldData::Int(42));
        assert_eq!(int.parse_value(" 99999999999"), FieldData::Int64(99999999999));
        let text = AttributeField::new("T", FieldDataType::Text, 8, 0);
        assert_eq!(text.parse_value("SW-001  "), FieldData::Text("SW-001".to_string()));
        let date = AttributeField::new("D", FieldDataType::Date, 8, 0);
        assert_eq!(date.parse_value("20261018").to_string(), "20261018");
    }

    #[test]
    fn test_format_value() {
        let num = AttributeField::new("N", FieldDataType::Real, 8, 2);
        assert_eq!(num.format_value(&FieldData::Real(3.14159)).unwrap(), b"    3.14");
        assert!(num.format_value(&FieldData::Real(123456789.0)).is_err());
        let text = AttributeField::new("T", FieldDataType::Text, 4, 0);
        assert_eq!(text.format_value(&FieldData::Text("ab".into())).unwrap(), b"ab  ");
        assert_eq!(text.format_value(&FieldData::Text("abcdef".into())).unwrap(), b"abcd");
        assert_eq!(text.format_value(&FieldData::Null).unwrap(), b"    ");
        // multi-byte characters are never split
        assert_eq!(text.format_value(&FieldData::Text("abcé".into())).unwrap(), b"abc ");
    }

    #[test]
    fn test_field_data_views() {
        assert_eq!(FieldData::Int(5).as_f64(), Some(5.0));
        assert_eq!(FieldData::Text(" 7.25 ".into()).as_f64(), Some(7.25));
        assert_eq!(FieldData::Text("n/a".into()).as_f64(), None);
        assert_eq!(FieldData::Null.as_string(), None);
        assert_eq!(FieldData::Int64(12).as_string(), Some("12".to_string()));
    }
}
