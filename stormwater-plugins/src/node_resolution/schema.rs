/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/

use stormwater_vector::{AttributeField, EditSession, FieldDataType, MAX_TEXT_FIELD_LENGTH};
use std::io::Error;

const MIN_NODE_FIELD_WIDTH: usize = 10;

/// Width of a character field able to hold every asset ID.
pub fn node_field_width(longest_asset_id: usize) -> u8 {
    longest_asset_id.clamp(MIN_NODE_FIELD_WIDTH, MAX_TEXT_FIELD_LENGTH) as u8
}

/// Makes sure a character field named `name` exists in the session's schema
/// and is at least `width` bytes wide, returning its index. Existing fields
/// and their values are kept.
pub fn ensure_text_field(session: &mut EditSession, name: &str, width: u8) -> Result<usize, Error> {
    match session.field_index(name) {
        Some(index) => {
            session.widen_field(index, width)?;
            Ok(index)
        }
        None => session.add_attribute(&AttributeField::new(name, FieldDataType::Text, width, 0)),
    }
}

/// Ensures the upstream and downstream node fields, in that order.
pub fn ensure_node_fields(
    session: &mut EditSession,
    upstream: &str,
    downstream: &str,
    width: u8,
) -> Result<(usize, usize), Error> {
    let us = ensure_text_field(session, upstream, width)?;
    let ds = ensure_text_field(session, downstream, width)?;
    Ok((us, ds))
}
