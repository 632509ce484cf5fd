pub mod registry;

use std::collections::BTreeSet;

use crate::certificate::CopyrightClause;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    /// Centered on the page; the op's x is ignored.
    Center,
    /// Right edge sits at x + width.
    Right,
}

/// Where the text of an op comes from at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Literal(&'static str),
    Field(&'static str),
    /// Two field values joined by a fixed separator, e.g. "1 / 10".
    JoinedFields(&'static str, &'static str, &'static str),
    /// The UTC generation timestamp.
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Named file under the assets folder; missing files are skipped.
    Asset(&'static str),
    /// The caller-uploaded preview image.
    Preview,
    /// QR code carrying the certificate's download URL.
    QrCode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOp {
    pub source: TextSource,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub opacity: f32,
    /// Wrap/alignment box width; None draws unwrapped.
    pub width: Option<f32>,
    pub align: Align,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageOp {
    pub source: ImageSource,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkOp {
    pub display: &'static str,
    /// Field holding the target URL.
    pub href_field: &'static str,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRow {
    pub label: &'static str,
    pub source: TextSource,
}

/// A column of caption/value rows: each caption sits CAPTION_OFFSET above its
/// value, rows advance by a uniform stride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldColumnOp {
    pub x: f32,
    pub y: f32,
    pub stride: f32,
    pub width: f32,
    pub value_size: f32,
    pub value_color: Color,
    pub rows: &'static [FieldRow],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClauseSlot {
    pub tag: CopyrightClause,
    pub caption: &'static str,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Text(TextOp),
    Image(ImageOp),
    Link(LinkOp),
    FieldColumn(FieldColumnOp),
    /// Conditional copyright clause grid; each slot draws iff its tag is in
    /// the request's copyrights set.
    Clauses(&'static [ClauseSlot]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTemplate {
    /// Full-bleed background asset, drawn first when present.
    pub background: Option<&'static str>,
    pub ops: &'static [DrawOp],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CertificateTemplate {
    pub width: f32,
    pub height: f32,
    pub pages: &'static [PageTemplate],
}

pub const CAPTION_SIZE: f32 = 14.0;
pub const CAPTION_OFFSET: f32 = 20.0;
pub const CAPTION_OPACITY: f32 = 0.6;
pub const CAPTION_COLOR: Color = Color { r: 128, g: 128, b: 128 };

pub const CLAUSE_SIZE: f32 = 20.0;
pub const CLAUSE_COLOR: Color = Color { r: 74, g: 74, b: 74 };

impl CertificateTemplate {
    /// Field names this template reads from the request map.
    pub fn required_fields(&self) -> BTreeSet<&'static str> {
        let mut fields = BTreeSet::new();
        for page in self.pages {
            for op in page.ops {
                match op {
                    DrawOp::Text(text) => collect_source(&text.source, &mut fields),
                    DrawOp::Link(link) => {
                        fields.insert(link.href_field);
                    }
                    DrawOp::FieldColumn(column) => {
                        for row in column.rows {
                            collect_source(&row.source, &mut fields);
                        }
                    }
                    DrawOp::Image(_) | DrawOp::Clauses(_) => {}
                }
            }
        }
        fields
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn collect_source(source: &TextSource, fields: &mut BTreeSet<&'static str>) {
    match source {
        TextSource::Field(name) => {
            fields.insert(name);
        }
        TextSource::JoinedFields(first, _, second) => {
            fields.insert(first);
            fields.insert(second);
        }
        TextSource::Literal(_) | TextSource::Timestamp => {}
    }
}
