/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT

Notes: The logic behind working with the ESRI Shapefile format. A layer is the
.shp geometry file plus its .shx index, .dbf attribute table and optional .prj
projection file.
*/

pub mod attributes;
pub mod editing;
pub mod geometry;

use self::attributes::*;
use self::editing::EditSession;
use self::geometry::*;
use chrono::prelude::*;
use std::f64;
use std::fmt;
use std::fs;
use std::io::{Cursor, Error, ErrorKind};
use std::path::Path;
use stormwater_common::structures::Point2D;
use stormwater_common::utils::{ByteOrderReader, ByteOrderWriter, Endianness};

const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;

#[derive(Debug, Default, Clone)]
pub struct ShapefileHeader {
    file_code: i32,            // BigEndian; value is 9994
    pub file_length: i32,      // BigEndian; in 16-bit words
    pub version: i32,          // LittleEndian
    pub shape_type: ShapeType, // LittleEndian
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_min: f64, // set to 0f64 if shapeType not z or measured
    pub z_max: f64,
    pub m_min: f64,
    pub m_max: f64,
}

impl fmt::Display for ShapefileHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "file_code: {}
file_length: {}
version: {}
shape_type: {}
x_min: {}
x_max: {}
y_min: {}
y_max: {}",
            self.file_code,
            self.file_length,
            self.version,
            self.shape_type,
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max
        )
    }
}

/// `Shapefile` is an in-memory ESRI Shapefile.
///
/// Examples:
///
/// ```no_run
/// use stormwater_vector::*;
/// # fn main() -> std::io::Result<()> {
/// let mut pipes = Shapefile::read("Merged SW Lines.shp")?;
///
/// let mut session = pipes.start_editing();
/// let us = session.add_attribute(&AttributeField::new("US_NODE_ID", FieldDataType::Text, 20, 0))?;
/// session.change_attribute_value(0, us, FieldData::Text("SW-001".to_string()))?;
/// session.commit_changes()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct Shapefile {
    pub file_name: String,
    pub header: ShapefileHeader,
    pub records: Vec<ShapefileGeometry>,
    pub attributes: ShapefileAttributes,
    pub projection: String,
}

impl Shapefile {
    pub fn read(file_name: &str) -> Result<Shapefile, Error> {
        let mut sf = Shapefile {
            file_name: file_name.to_string(),
            ..Default::default()
        };
        sf.read_file()?;
        Ok(sf)
    }

    pub fn new(file_name: &str, shape_type: ShapeType) -> Shapefile {
        let file_name = if Path::new(file_name).extension().is_some() {
            file_name.to_string()
        } else {
            // likely no extension provided; default to .shp
            format!("{}.shp", file_name)
        };
        let mut sf = Shapefile {
            file_name,
            ..Default::default()
        };
        sf.header.shape_type = shape_type;
        sf
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    /// Returns the file name without its directory or extension, which is
    /// the name a GIS shows for the layer.
    pub fn get_short_filename(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Returns the ShapefileGeometry for a specified index, starting at zero.
    pub fn get_record(&self, index: usize) -> Option<&ShapefileGeometry> {
        self.records.get(index)
    }

    /// Adds a geometry together with its attribute record.
    pub fn add_record(
        &mut self,
        geometry: ShapefileGeometry,
        attributes: Vec<FieldData>,
    ) -> Result<(), Error> {
        if geometry.shape_type != ShapeType::Null
            && geometry.shape_type != self.header.shape_type
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Attempt to add a {} record to a {} layer.",
                    geometry.shape_type, self.header.shape_type
                ),
            ));
        }
        self.records.push(geometry);
        self.attributes.add_record(attributes, false);
        Ok(())
    }

    /// Starts a buffered edit session on the layer's attribute table. Nothing
    /// is changed, in memory or on disk, until the session is committed.
    pub fn start_editing(&mut self) -> EditSession<'_> {
        EditSession::new(self)
    }

    fn read_file(&mut self) -> Result<(), Error> {
        ///////////////////////////////
        // First read the geometries //
        ///////////////////////////////
        let buffer = fs::read(&self.file_name)?;
        let file_size = buffer.len();

        // Note: the shapefile format uses mixed endianness, so the reader's
        // byte order is switched frequently.
        let mut bor = ByteOrderReader::new(Cursor::new(buffer), Endianness::BigEndian)?;
        self.header.file_code = bor.read_i32()?;
        if self.header.file_code != FILE_CODE {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{} is not a Shapefile.", self.file_name),
            ));
        }
        bor.seek(24)?;
        self.header.file_length = bor.read_i32()?;

        // the rest of the header is in LittleEndian format
        bor.set_byte_order(Endianness::LittleEndian);
        self.header.version = bor.read_i32()?;
        self.header.shape_type = read_shape_type(&mut bor)?;
        self.header.x_min = bor.read_f64()?;
        self.header.y_min = bor.read_f64()?;
        self.header.x_max = bor.read_f64()?;
        self.header.y_max = bor.read_f64()?;
        self.header.z_min = bor.read_f64()?;
        self.header.z_max = bor.read_f64()?;
        self.header.m_min = bor.read_f64()?;
        self.header.m_max = bor.read_f64()?;

        while bor.pos() + 8 <= file_size {
            bor.set_byte_order(Endianness::BigEndian);
            bor.inc_pos(4)?; // We don't really need the record number
            let content_words = bor.read_i32()?; // in 16-bit words
            let record_start = bor.pos();
            let content_length = if content_words < 0 {
                None
            } else {
                (content_words as usize).checked_mul(2)
            };
            let content_length = match content_length {
                Some(len) if record_start.checked_add(len).map_or(false, |end| end <= file_size) => {
                    len
                }
                _ => {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        format!(
                            "Record {} has an invalid content length ({} words).",
                            self.records.len() + 1,
                            content_words
                        ),
                    ))
                }
            };
            bor.set_byte_order(Endianness::LittleEndian);
            let shape_type = read_shape_type(&mut bor)?;
            if shape_type != ShapeType::Null && shape_type != self.header.shape_type {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!(
                        "Record {} is a {} in a {} layer.",
                        self.records.len() + 1,
                        shape_type,
                        self.header.shape_type
                    ),
                ));
            }
            let sfg = read_geometry(&mut bor, shape_type, content_length)?;
            self.records.push(sfg);
            bor.seek(record_start + content_length)?;
        }

        //////////////////////////////
        // Read the projection file //
        //////////////////////////////
        let prj_file = Path::new(&self.file_name).with_extension("prj");
        if let Ok(projection) = fs::read_to_string(prj_file) {
            self.projection = projection;
        }

        ///////////////////////////////
        // Read the attributes table //
        ///////////////////////////////
        let dbf_file = Path::new(&self.file_name).with_extension("dbf");
        let buffer = fs::read(&dbf_file).map_err(|e| {
            Error::new(
                e.kind(),
                format!("Could not read the attribute table {}: {}", dbf_file.display(), e),
            )
        })?;
        self.attributes = read_attributes(buffer)?;

        if self.attributes.num_records() != self.records.len() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "{} has {} geometries but {} attribute records.",
                    self.file_name,
                    self.records.len(),
                    self.attributes.num_records()
                ),
            ));
        }

        Ok(())
    }

    /// Writes the layer to its file name.
    pub fn write(&mut self) -> Result<(), Error> {
        self.calculate_extent();
        let file_name = self.file_name.clone();
        self.write_files(&file_name, &self.attributes)
    }

    /// Encodes every component of the layer and then swaps each one into
    /// place. Components are written to temporary siblings first, so an
    /// encoding or I/O failure leaves any existing files untouched.
    pub(crate) fn write_files(
        &self,
        file_name: &str,
        attributes: &ShapefileAttributes,
    ) -> Result<(), Error> {
        let path = Path::new(file_name);
        let mut components = vec![
            (path.with_extension("shp"), self.encode_geometries()?),
            (path.with_extension("shx"), self.encode_index()?),
            (path.with_extension("dbf"), encode_attributes(attributes)?),
        ];
        if !self.projection.is_empty() {
            components.push((path.with_extension("prj"), self.projection.as_bytes().to_vec()));
        }

        let mut staged = vec![];
        for (target, bytes) in &components {
            let tmp = target.with_file_name(format!(
                "{}.tmp",
                target
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default()
            ));
            if let Err(e) = fs::write(&tmp, bytes) {
                for (t, _) in &staged {
                    let _ = fs::remove_file(t);
                }
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
            staged.push((tmp, target.clone()));
        }
        for (tmp, target) in &staged {
            fs::rename(tmp, target)?;
        }
        Ok(())
    }

    fn write_main_header<W: std::io::Write>(
        &self,
        writer: &mut ByteOrderWriter<W>,
        file_length: i32,
    ) -> Result<(), Error> {
        writer.set_byte_order(Endianness::BigEndian);
        writer.write_i32(FILE_CODE)?;
        // unused header bytes
        for _ in 0..5 {
            writer.write_i32(0i32)?;
        }
        writer.write_i32(file_length)?;

        writer.set_byte_order(Endianness::LittleEndian);
        writer.write_i32(VERSION)?;
        writer.write_i32(self.header.shape_type.to_int())?;
        writer.write_f64(self.header.x_min)?;
        writer.write_f64(self.header.y_min)?;
        writer.write_f64(self.header.x_max)?;
        writer.write_f64(self.header.y_max)?;
        writer.write_f64(self.header.z_min)?;
        writer.write_f64(self.header.z_max)?;
        writer.write_f64(self.header.m_min)?;
        writer.write_f64(self.header.m_max)?;
        Ok(())
    }

    fn encode_geometries(&self) -> Result<Vec<u8>, Error> {
        let mut size = 100i32; // initialized to the size of the file header
        for sfg in &self.records {
            size += 8 + sfg.get_length();
        }
        let mut writer = ByteOrderWriter::new(Vec::with_capacity(size as usize), Endianness::BigEndian);
        self.write_main_header(&mut writer, size / 2)?;

        for (i, sfg) in self.records.iter().enumerate() {
            writer.set_byte_order(Endianness::BigEndian);
            writer.write_i32(i as i32 + 1i32)?; // Record number
            writer.write_i32(sfg.get_length() / 2)?; // Content length in 16-bit words
            writer.set_byte_order(Endianness::LittleEndian);
            if sfg.is_null() {
                writer.write_i32(ShapeType::Null.to_int())?;
                continue;
            }
            writer.write_i32(sfg.shape_type.to_int())?;
            write_geometry(&mut writer, sfg)?;
        }
        Ok(writer.into_inner())
    }

    fn encode_index(&self) -> Result<Vec<u8>, Error> {
        let file_length = (100 + 8 * self.records.len()) as i32 / 2i32; // in 16-bit words
        let mut writer = ByteOrderWriter::new(Vec::<u8>::new(), Endianness::BigEndian);
        self.write_main_header(&mut writer, file_length)?;
        writer.set_byte_order(Endianness::BigEndian);
        let mut pos = 100i32;
        for sfg in &self.records {
            writer.write_i32(pos / 2)?; // Record offset
            writer.write_i32(sfg.get_length() / 2)?; // Content length in 16-bit words
            pos += 8 + sfg.get_length();
        }
        Ok(writer.into_inner())
    }

    pub(crate) fn calculate_extent(&mut self) {
        let mut h = ShapefileHeader {
            file_code: FILE_CODE,
            version: VERSION,
            shape_type: self.header.shape_type,
            x_min: f64::INFINITY,
            y_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_max: f64::NEG_INFINITY,
            z_min: f64::INFINITY,
            z_max: f64::NEG_INFINITY,
            m_min: f64::INFINITY,
            m_max: f64::NEG_INFINITY,
            ..Default::default()
        };
        for sfg in self.records.iter().filter(|r| !r.is_null()) {
            h.x_min = h.x_min.min(sfg.x_min);
            h.y_min = h.y_min.min(sfg.y_min);
            h.x_max = h.x_max.max(sfg.x_max);
            h.y_max = h.y_max.max(sfg.y_max);
            for z in &sfg.z_array {
                h.z_min = h.z_min.min(*z);
                h.z_max = h.z_max.max(*z);
            }
            for m in &sfg.m_array {
                h.m_min = h.m_min.min(*m);
                h.m_max = h.m_max.max(*m);
            }
        }
        // empty layers and missing dimensions are written as zeros
        for v in [
            &mut h.x_min, &mut h.y_min, &mut h.x_max, &mut h.y_max,
            &mut h.z_min, &mut h.z_max, &mut h.m_min, &mut h.m_max,
        ] {
            if !v.is_finite() {
                *v = 0f64;
            }
        }
        h.file_length = self.header.file_length;
        self.header = h;
    }
}

fn read_shape_type<R: std::io::Read + std::io::Seek>(
    bor: &mut ByteOrderReader<R>,
) -> Result<ShapeType, Error> {
    let st = bor.read_i32()?;
    ShapeType::from_int(st).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Unsupported shape type code {}.", st),
        )
    })
}

fn read_points<R: std::io::Read + std::io::Seek>(
    bor: &mut ByteOrderReader<R>,
    num_points: usize,
) -> Result<Vec<Point2D>, Error> {
    let mut points = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        points.push(Point2D::new(bor.read_f64()?, bor.read_f64()?));
    }
    Ok(points)
}

/// Reads a range (min, max) followed by `n` values.
fn read_range<R: std::io::Read + std::io::Seek>(
    bor: &mut ByteOrderReader<R>,
    n: usize,
) -> Result<Vec<f64>, Error> {
    bor.inc_pos(16)?;
    (0..n).map(|_| bor.read_f64()).collect()
}

fn read_geometry<R: std::io::Read + std::io::Seek>(
    bor: &mut ByteOrderReader<R>,
    shape_type: ShapeType,
    content_length: usize,
) -> Result<ShapefileGeometry, Error> {
    let mut sfg = ShapefileGeometry::new(shape_type);
    match shape_type {
        ShapeType::Null => {}

        ShapeType::Point | ShapeType::PointM | ShapeType::PointZ => {
            sfg.add_point(Point2D::new(bor.read_f64()?, bor.read_f64()?));
            if shape_type == ShapeType::PointZ {
                let z = bor.read_f64()?;
                sfg.z_min = z;
                sfg.z_max = z;
                sfg.z_array.push(z);
            }
            // z records carry an optional measure; 36 bytes means it's there
            if shape_type == ShapeType::PointM
                || (shape_type == ShapeType::PointZ && content_length >= 36)
            {
                let m = bor.read_f64()?;
                sfg.m_min = m;
                sfg.m_max = m;
                sfg.m_array.push(m);
            }
        }

        ShapeType::PolyLine | ShapeType::PolyLineM | ShapeType::PolyLineZ => {
            bor.inc_pos(32)?; // the record's bounding box is recalculated from the points
            let num_parts = bor.read_i32()?;
            let num_points = bor.read_i32()?;
            if num_parts < 0 || num_points < 0 {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    "Negative part or point count in PolyLine record.",
                ));
            }
            let (num_parts, num_points) = (num_parts as usize, num_points as usize);
            let xy_length = num_parts
                .checked_mul(4)
                .zip(num_points.checked_mul(16))
                .and_then(|(p, n)| p.checked_add(n))
                .and_then(|len| len.checked_add(44));
            let xy_length = match xy_length {
                Some(len) if len <= content_length => len,
                _ => return Err(truncated_polyline()),
            };
            // each z or m range is 16 bytes plus 8 per point
            let range_length = 16 + 8 * num_points;
            if shape_type != ShapeType::PolyLine && xy_length + range_length > content_length {
                return Err(truncated_polyline());
            }
            let mut parts = Vec::with_capacity(num_parts);
            for _ in 0..num_parts {
                parts.push(bor.read_i32()? as usize);
            }
            let points = read_points(bor, num_points)?;
            let z_values = if shape_type == ShapeType::PolyLineZ {
                read_range(bor, num_points)?
            } else {
                vec![]
            };
            let has_m = match shape_type {
                ShapeType::PolyLineM => true,
                ShapeType::PolyLineZ => content_length >= xy_length + 2 * range_length,
                _ => false,
            };
            let m_values = if has_m {
                read_range(bor, num_points)?
            } else {
                vec![]
            };

            for p in 0..num_parts {
                let start = parts[p];
                let end = if p < num_parts - 1 { parts[p + 1] } else { num_points };
                if start > end || end > num_points {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        "PolyLine part indices are out of order.",
                    ));
                }
                let part_points = &points[start..end];
                if !z_values.is_empty() {
                    sfg.add_partz(part_points, &z_values[start..end]);
                } else if !m_values.is_empty() {
                    sfg.add_partm(part_points, &m_values[start..end]);
                } else {
                    sfg.add_part(part_points);
                }
                // z records may carry measures too
                if !z_values.is_empty() && !m_values.is_empty() {
                    for m in &m_values[start..end] {
                        sfg.m_min = sfg.m_min.min(*m);
                        sfg.m_max = sfg.m_max.max(*m);
                        sfg.m_array.push(*m);
                    }
                }
            }
        }
    }
    Ok(sfg)
}

fn truncated_polyline() -> Error {
    Error::new(ErrorKind::InvalidData, "PolyLine record is truncated.")
}

fn write_geometry<W: std::io::Write>(
    writer: &mut ByteOrderWriter<W>,
    sfg: &ShapefileGeometry,
) -> Result<(), Error> {
    match sfg.shape_type {
        ShapeType::Null => {}
        ShapeType::Point | ShapeType::PointM | ShapeType::PointZ => {
            writer.write_f64(sfg.points[0].x)?;
            writer.write_f64(sfg.points[0].y)?;
            if sfg.shape_type == ShapeType::PointZ {
                writer.write_f64(sfg.z_array.first().copied().unwrap_or(0f64))?;
            }
            if sfg.shape_type == ShapeType::PointM
                || (sfg.shape_type == ShapeType::PointZ && sfg.has_m_data())
            {
                writer.write_f64(sfg.m_array.first().copied().unwrap_or(0f64))?;
            }
        }
        ShapeType::PolyLine | ShapeType::PolyLineM | ShapeType::PolyLineZ => {
            writer.write_f64(sfg.x_min)?;
            writer.write_f64(sfg.y_min)?;
            writer.write_f64(sfg.x_max)?;
            writer.write_f64(sfg.y_max)?;
            writer.write_i32(sfg.num_parts() as i32)?;
            writer.write_i32(sfg.num_points() as i32)?;
            for part in &sfg.parts {
                writer.write_i32(*part)?;
            }
            for pt in &sfg.points {
                writer.write_f64(pt.x)?;
                writer.write_f64(pt.y)?;
            }
            if sfg.shape_type == ShapeType::PolyLineZ {
                write_range(writer, sfg.z_min, sfg.z_max, &sfg.z_array, sfg.num_points())?;
            }
            if sfg.shape_type == ShapeType::PolyLineM
                || (sfg.shape_type == ShapeType::PolyLineZ && sfg.has_m_data())
            {
                write_range(writer, sfg.m_min, sfg.m_max, &sfg.m_array, sfg.num_points())?;
            }
        }
    }
    Ok(())
}

fn write_range<W: std::io::Write>(
    writer: &mut ByteOrderWriter<W>,
    min: f64,
    max: f64,
    values: &[f64],
    n: usize,
) -> Result<(), Error> {
    let (min, max) = if values.is_empty() { (0f64, 0f64) } else { (min, max) };
    writer.write_f64(min)?;
    writer.write_f64(max)?;
    for i in 0..n {
        writer.write_f64(values.get(i).copied().unwrap_or(0f64))?;
    }
    Ok(())
}

fn read_attributes(buffer: Vec<u8>) -> Result<ShapefileAttributes, Error> {
    let mut bor = ByteOrderReader::new(Cursor::new(buffer), Endianness::LittleEndian)?;
    let mut attributes = ShapefileAttributes::default();

    let mut header = AttributeHeader::default();
    header.version = bor.read_u8()?;
    header.year = 1900u32 + bor.read_u8()? as u32;
    header.month = bor.read_u8()?;
    header.day = bor.read_u8()?;
    let num_records = bor.read_u32()?;
    header.num_records = num_records;
    header.bytes_in_header = bor.read_u16()?;
    header.bytes_in_record = bor.read_u16()?;
    bor.inc_pos(2)?; // reserved bytes
    header.incomplete_transaction = bor.read_u8()?;
    header.encryption_flag = bor.read_u8()?;
    bor.inc_pos(12)?; // free record thread and multi-user dBASE bytes
    header.mdx_flag = bor.read_u8()?;
    header.language_driver_id = bor.read_u8()?;
    bor.inc_pos(2)?; // reserved bytes

    // field descriptors run until the 0x0d terminator
    while bor.peek_u8()? != 0x0d {
        let name = bor.read_utf8(11)?.replace(char::from(0), "");
        let field_type = char::from(bor.read_u8()?);
        bor.inc_pos(4)?;
        let field_length = bor.read_u8()?;
        let decimal_count = bor.read_u8()?;
        bor.inc_pos(14)?;
        attributes.add_field(&AttributeField {
            name: name.trim().to_string(),
            field_type,
            field_length,
            decimal_count,
        });
    }
    attributes.header = header;
    attributes.header.num_fields = attributes.num_fields() as u32;

    // records start right after the header, whatever the descriptor count
    bor.seek(attributes.header.bytes_in_header as usize)?;

    for _ in 0..num_records {
        let deleted = bor.read_u8()? == 0x2A;
        let mut rec: Vec<FieldData> = Vec::with_capacity(attributes.num_fields());
        for j in 0..attributes.num_fields() {
            let raw = bor.read_utf8(attributes.fields[j].field_length as usize)?;
            rec.push(attributes.fields[j].parse_value(&raw));
        }
        attributes.add_record(rec, deleted);
    }

    Ok(attributes)
}

fn encode_attributes(attributes: &ShapefileAttributes) -> Result<Vec<u8>, Error> {
    let num_fields = attributes.num_fields();
    let header_size = 32u16 + num_fields as u16 * 32u16 + 1u16;
    let bytes_in_record: usize =
        1 + attributes.fields.iter().map(|f| f.field_length as usize).sum::<usize>();
    if bytes_in_record > u16::MAX as usize {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "The attribute table's records are too wide for the dBase format.",
        ));
    }

    let mut writer = ByteOrderWriter::new(Vec::<u8>::new(), Endianness::LittleEndian);
    writer.write_u8(3u8)?; // dBase III

    let now = Local::now();
    writer.write_u8((now.year() - 1900) as u8)?;
    writer.write_u8(now.month() as u8)?;
    writer.write_u8(now.day() as u8)?;

    writer.write_u32(attributes.num_records() as u32)?;
    writer.write_u16(header_size)?;
    writer.write_u16(bytes_in_record as u16)?;

    // reserved or unused bytes
    writer.write_bytes(&[0u8; 20])?;

    // Field descriptor array
    for field in &attributes.fields {
        let mut name = field.name.as_bytes().to_vec();
        if name.len() > MAX_FIELD_NAME_LENGTH {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Field name '{}' is longer than {} bytes.",
                    field.name, MAX_FIELD_NAME_LENGTH
                ),
            ));
        }
        name.resize(MAX_FIELD_NAME_LENGTH + 1, 0u8);
        writer.write_bytes(&name)?;
        writer.write_u8(field.field_type as u8)?;
        writer.write_bytes(&[0u8; 4])?;
        writer.write_u8(field.field_length)?;
        writer.write_u8(field.decimal_count)?;
        writer.write_bytes(&[0u8; 14])?;
    }

    writer.write_u8(0x0D)?; // terminator byte

    for i in 0..attributes.num_records() {
        let deleted = attributes.is_deleted.get(i).copied().unwrap_or(false);
        writer.write_u8(if deleted { 0x2A } else { 0x20 })?;
        if let Some(rec) = attributes.get_record(i) {
            for (field, value) in attributes.fields.iter().zip(rec.iter()) {
                writer.write_bytes(&field.format_value(value)?)?;
            }
        }
    }

    writer.write_u8(0x1A)?; // file terminator byte
    Ok(writer.into_inner())
}
