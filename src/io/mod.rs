// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - field documents, shape files and mesh export

mod exporter;
mod field;
mod importer;

pub use exporter::export_stl;
pub use field::{
    format_real, parse_fields, write_int_field, write_real_field, write_vector_field,
    write_word_field, Field, FieldValue,
};
pub use importer::{read_shape_file, write_shape_file};
