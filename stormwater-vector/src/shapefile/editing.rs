/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/

use super::attributes::{AttributeField, FieldData, MAX_FIELD_NAME_LENGTH};
use super::Shapefile;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};

/// A buffered edit of a layer's attribute table.
///
/// Field additions, field widening and value changes are held by the session
/// and only reach the layer, and its files, when `commit_changes` succeeds.
/// Dropping the session or calling `rollback` discards them. The session
/// mutably borrows the layer, so no other edit can be open at the same time.
pub struct EditSession<'a> {
    layer: &'a mut Shapefile,
    added_fields: Vec<AttributeField>,
    resized_fields: BTreeMap<usize, u8>,
    changes: BTreeMap<(usize, usize), FieldData>,
}

impl<'a> EditSession<'a> {
    pub(crate) fn new(layer: &'a mut Shapefile) -> EditSession<'a> {
        EditSession {
            layer,
            added_fields: vec![],
            resized_fields: BTreeMap::new(),
            changes: BTreeMap::new(),
        }
    }

    pub fn num_records(&self) -> usize {
        self.layer.num_records()
    }

    pub fn num_fields(&self) -> usize {
        self.layer.attributes.num_fields() + self.added_fields.len()
    }

    /// Case-sensitive field lookup, including fields added in this session.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.layer.attributes.get_field_num(name).or_else(|| {
            self.added_fields
                .iter()
                .position(|f| f.name == name)
                .map(|i| i + self.layer.attributes.num_fields())
        })
    }

    /// Returns the field as it will be written, with any pending widening.
    pub fn field(&self, index: usize) -> Option<AttributeField> {
        let existing = self.layer.attributes.num_fields();
        if index < existing {
            let mut field = self.layer.attributes.get_field(index)?.clone();
            if let Some(len) = self.resized_fields.get(&index) {
                field.field_length = *len;
            }
            Some(field)
        } else {
            self.added_fields.get(index - existing).cloned()
        }
    }

    /// Adds a field to the schema and returns its index. Every existing
    /// record holds Null for the new field until a value is set. Names must
    /// fit a dBase descriptor, so they are stored exactly as given.
    pub fn add_attribute(&mut self, field: &AttributeField) -> Result<usize, Error> {
        if field.name.is_empty() || field.name.len() > MAX_FIELD_NAME_LENGTH {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Field name '{}' must be 1 to {} bytes long.",
                    field.name, MAX_FIELD_NAME_LENGTH
                ),
            ));
        }
        if self.field_index(&field.name).is_some() {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("The layer already has a field named {}.", field.name),
            ));
        }
        self.added_fields.push(field.clone());
        Ok(self.num_fields() - 1)
    }

    /// Grows a field's width. Requests that would shrink it are ignored.
    pub fn widen_field(&mut self, index: usize, length: u8) -> Result<(), Error> {
        let current = self
            .field(index)
            .ok_or_else(|| field_error(index))?
            .field_length;
        if length <= current {
            return Ok(());
        }
        let existing = self.layer.attributes.num_fields();
        if index < existing {
            self.resized_fields.insert(index, length);
        } else {
            self.added_fields[index - existing].field_length = length;
        }
        Ok(())
    }

    /// Buffers a new value for one attribute of one feature. A later change
    /// to the same cell replaces an earlier one.
    pub fn change_attribute_value(
        &mut self,
        fid: usize,
        field_index: usize,
        value: FieldData,
    ) -> Result<(), Error> {
        if fid >= self.num_records() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Feature {} does not exist.", fid),
            ));
        }
        let field = self.field(field_index).ok_or_else(|| field_error(field_index))?;
        // fail now rather than at commit if the value can't be stored
        field.format_value(&value)?;
        self.changes.insert((fid, field_index), value);
        Ok(())
    }

    pub fn num_pending_changes(&self) -> usize {
        self.changes.len()
    }

    pub fn is_modified(&self) -> bool {
        !self.added_fields.is_empty() || !self.resized_fields.is_empty() || !self.changes.is_empty()
    }

    /// Applies the buffered edits and writes the layer back to its own file.
    pub fn commit_changes(self) -> Result<(), Error> {
        let file_name = self.layer.file_name.clone();
        self.commit_changes_to(&file_name)
    }

    /// Applies the buffered edits and writes the layer to `file_name`. The
    /// layer then refers to that file. On error the layer and any files are
    /// left as they were.
    pub fn commit_changes_to(self, file_name: &str) -> Result<(), Error> {
        let EditSession {
            layer,
            added_fields,
            resized_fields,
            changes,
        } = self;
        let mut attributes = layer.attributes.clone();
        for (index, length) in resized_fields {
            attributes.set_field_length(index, length)?;
        }
        for field in &added_fields {
            attributes.add_field(field);
        }
        for ((fid, field_index), value) in changes {
            attributes.set_value(fid, field_index, value)?;
        }

        layer.calculate_extent();
        layer.write_files(file_name, &attributes)?;
        layer.attributes = attributes;
        layer.file_name = file_name.to_string();
        Ok(())
    }

    /// Discards every buffered edit.
    pub fn rollback(self) {}
}

fn field_error(index: usize) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!("Field {} does not exist.", index),
    )
}
