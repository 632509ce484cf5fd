use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::certificate::CertificateRequest;
use crate::error::RenderError;
use crate::template::{
    Align, CertificateTemplate, ClauseSlot, Color, DrawOp, FieldColumnOp, ImageOp, ImageSource,
    LinkOp, PageTemplate, TextOp, TextSource, CAPTION_COLOR, CAPTION_OFFSET, CAPTION_OPACITY,
    CAPTION_SIZE, CLAUSE_COLOR, CLAUSE_SIZE,
};

use super::fonts;
use super::images::{self, RasterImage};

#[derive(Clone, Copy)]
struct Embedded {
    id: ObjectId,
    width: u32,
    height: u32,
}

/// Executes a template's draw ops against a request, building one lopdf
/// document. Template coordinates are top-left based and flipped into PDF
/// space here.
pub struct Composer<'a> {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<ObjectId>,
    template: &'static CertificateTemplate,
    request: &'a CertificateRequest,
    stamp: &'a str,
    assets_dir: &'a Path,
    preview: Embedded,
    qr: Embedded,
    ops: Vec<Operation>,
    page_xobjects: Vec<(String, ObjectId)>,
    page_gstates: Vec<(String, f32)>,
    page_annots: Vec<Object>,
}

impl<'a> Composer<'a> {
    pub fn new(
        template: &'static CertificateTemplate,
        request: &'a CertificateRequest,
        stamp: &'a str,
        preview: RasterImage,
        qr: RasterImage,
        assets_dir: &'a Path,
    ) -> Composer<'a> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => fonts::BASE_FONT,
            "Encoding" => fonts::FONT_ENCODING,
        });
        let preview_id = doc.add_object(preview.stream);
        let qr_id = doc.add_object(qr.stream);

        Composer {
            doc,
            pages_id,
            font_id,
            page_ids: Vec::new(),
            template,
            request,
            stamp,
            assets_dir,
            preview: Embedded {
                id: preview_id,
                width: preview.width,
                height: preview.height,
            },
            qr: Embedded {
                id: qr_id,
                width: qr.width,
                height: qr.height,
            },
            ops: Vec::new(),
            page_xobjects: Vec::new(),
            page_gstates: Vec::new(),
            page_annots: Vec::new(),
        }
    }

    pub fn compose_page(&mut self, page: &PageTemplate) -> Result<(), RenderError> {
        self.ops.clear();
        self.page_xobjects.clear();
        self.page_gstates.clear();
        self.page_annots.clear();

        if let Some(asset) = page.background {
            if let Some(background) = self.load_asset(asset) {
                self.place_xobject(
                    background.id,
                    0.0,
                    0.0,
                    self.template.width,
                    self.template.height,
                );
            }
        }

        for op in page.ops {
            match op {
                DrawOp::Text(text) => self.draw_text_op(text),
                DrawOp::Image(image) => self.draw_image_op(image),
                DrawOp::Link(link) => self.draw_link_op(link),
                DrawOp::FieldColumn(column) => self.draw_field_column(column),
                DrawOp::Clauses(slots) => self.draw_clauses(slots),
            }
        }

        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.encode()?));

        let mut resources = dictionary! {
            "Font" => dictionary! { fonts::FONT_RESOURCE => self.font_id },
        };
        if !self.page_xobjects.is_empty() {
            let mut xobjects = Dictionary::new();
            for (name, id) in &self.page_xobjects {
                xobjects.set(name.clone(), Object::Reference(*id));
            }
            resources.set("XObject", xobjects);
        }
        if !self.page_gstates.is_empty() {
            let mut gstates = Dictionary::new();
            for (name, alpha) in &self.page_gstates {
                gstates.set(
                    name.clone(),
                    dictionary! { "Type" => "ExtGState", "ca" => *alpha, "CA" => *alpha },
                );
            }
            resources.set("ExtGState", gstates);
        }

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Resources" => resources,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                self.template.width.into(),
                self.template.height.into(),
            ],
            "Contents" => content_id,
        };
        if !self.page_annots.is_empty() {
            page_dict.set("Annots", self.page_annots.clone());
        }

        let page_id = self.doc.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(())
    }

    pub fn finish(mut self) -> Document {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }

    fn draw_text_op(&mut self, text: &TextOp) {
        let resolved = self.resolve_source(&text.source);
        self.draw_text_block(
            &resolved, text.x, text.y, text.size, text.color, text.opacity, text.width, text.align,
        );
    }

    fn draw_image_op(&mut self, image: &ImageOp) {
        let embedded = match image.source {
            ImageSource::Preview => self.preview,
            ImageSource::QrCode => self.qr,
            ImageSource::Asset(name) => match self.load_asset(name) {
                Some(embedded) => embedded,
                None => return,
            },
        };
        let fit = images::contain(
            embedded.width,
            embedded.height,
            image.x,
            image.y,
            image.width,
            image.height,
        );
        self.place_xobject(embedded.id, fit.x, fit.y, fit.width, fit.height);
    }

    fn draw_link_op(&mut self, link: &LinkOp) {
        let url = match self.request.field(link.href_field) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => return,
        };
        let text_width = fonts::text_width(link.display, link.size);
        let line_height = fonts::line_height(link.size);

        self.draw_text_block(
            link.display,
            link.x,
            link.y,
            link.size,
            link.color,
            1.0,
            None,
            Align::Left,
        );

        // Underline spans the measured text width, one line height below
        // the text top.
        let underline_y = self.template.height - (link.y + line_height);
        let (r, g, b) = components(link.color);
        let stroke_width = 1.0f32;
        self.op("q", vec![]);
        self.op("RG", vec![r.into(), g.into(), b.into()]);
        self.op("w", vec![stroke_width.into()]);
        self.op("m", vec![link.x.into(), underline_y.into()]);
        self.op("l", vec![(link.x + text_width).into(), underline_y.into()]);
        self.op("S", vec![]);
        self.op("Q", vec![]);

        // The clickable region is exactly the rendered text box.
        let annotation_id = self.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![
                link.x.into(),
                (self.template.height - link.y - line_height).into(),
                (link.x + text_width).into(),
                (self.template.height - link.y).into(),
            ],
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "A" => dictionary! {
                "Type" => "Action",
                "S" => "URI",
                "URI" => Object::string_literal(url),
            },
        });
        self.page_annots.push(Object::Reference(annotation_id));
    }

    fn draw_field_column(&mut self, column: &FieldColumnOp) {
        for (index, row) in column.rows.iter().enumerate() {
            let row_y = column.y + index as f32 * column.stride;
            self.draw_text_block(
                row.label,
                column.x,
                row_y,
                CAPTION_SIZE,
                CAPTION_COLOR,
                CAPTION_OPACITY,
                Some(column.width),
                Align::Left,
            );
            let value = self.resolve_source(&row.source);
            self.draw_text_block(
                &value,
                column.x,
                row_y + CAPTION_OFFSET,
                column.value_size,
                column.value_color,
                1.0,
                Some(column.width),
                Align::Left,
            );
        }
    }

    fn draw_clauses(&mut self, slots: &[ClauseSlot]) {
        for slot in slots {
            if !self.request.copyrights.contains(&slot.tag) {
                continue;
            }
            self.draw_text_block(
                slot.caption,
                slot.x,
                slot.y,
                CLAUSE_SIZE,
                CLAUSE_COLOR,
                1.0,
                Some(slot.width),
                Align::Left,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text_block(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
        opacity: f32,
        width: Option<f32>,
        align: Align,
    ) {
        if text.is_empty() {
            return;
        }
        let gstate = if opacity < 1.0 {
            Some(self.gstate_for(opacity))
        } else {
            None
        };
        let lines = wrap_text(text, size, width);
        let line_height = fonts::line_height(size);
        let (r, g, b) = components(color);

        if let Some(name) = &gstate {
            self.op("q", vec![]);
            self.op("gs", vec![Object::Name(name.clone().into_bytes())]);
        }
        for (index, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_width = fonts::text_width(line, size);
            let draw_x = match align {
                Align::Left => x,
                Align::Center => (self.template.width - line_width) / 2.0,
                Align::Right => x + width.unwrap_or(0.0) - line_width,
            };
            let top = y + index as f32 * line_height;
            let baseline = self.template.height - top - fonts::ascent(size);

            self.op("BT", vec![]);
            self.op("Tf", vec![fonts::FONT_RESOURCE.into(), size.into()]);
            self.op("rg", vec![r.into(), g.into(), b.into()]);
            self.op("Td", vec![draw_x.into(), baseline.into()]);
            self.op(
                "Tj",
                vec![Object::String(
                    fonts::encode_text(line),
                    StringFormat::Literal,
                )],
            );
            self.op("ET", vec![]);
        }
        if gstate.is_some() {
            self.op("Q", vec![]);
        }
    }

    fn place_xobject(&mut self, id: ObjectId, x: f32, top_y: f32, width: f32, height: f32) {
        let name = format!("Im{}", self.page_xobjects.len());
        self.page_xobjects.push((name.clone(), id));

        let y = self.template.height - top_y - height;
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                width.into(),
                0.into(),
                0.into(),
                height.into(),
                x.into(),
                y.into(),
            ],
        );
        self.op("Do", vec![Object::Name(name.into_bytes())]);
        self.op("Q", vec![]);
    }

    fn load_asset(&mut self, name: &str) -> Option<Embedded> {
        let path = self.assets_dir.join(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!("Skipping missing asset {}: {}", path.display(), error);
                return None;
            }
        };
        let decoded = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded,
            Err(error) => {
                tracing::warn!("Skipping undecodable asset {}: {}", path.display(), error);
                return None;
            }
        };
        match images::encode_raster(&decoded) {
            Ok(raster) => {
                let id = self.doc.add_object(raster.stream);
                Some(Embedded {
                    id,
                    width: raster.width,
                    height: raster.height,
                })
            }
            Err(error) => {
                tracing::warn!("Skipping asset {}: {}", path.display(), error);
                None
            }
        }
    }

    fn gstate_for(&mut self, opacity: f32) -> String {
        let name = format!("GS{}", (opacity * 100.0).round() as u32);
        if !self.page_gstates.iter().any(|(existing, _)| existing == &name) {
            self.page_gstates.push((name.clone(), opacity));
        }
        name
    }

    fn resolve_source(&self, source: &TextSource) -> String {
        match source {
            TextSource::Literal(text) => (*text).to_string(),
            TextSource::Field(name) => self.request.field(name).unwrap_or_default().to_string(),
            TextSource::JoinedFields(first, separator, second) => format!(
                "{}{}{}",
                self.request.field(first).unwrap_or_default(),
                separator,
                self.request.field(second).unwrap_or_default()
            ),
            TextSource::Timestamp => self.stamp.to_string(),
        }
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }
}

fn components(color: Color) -> (f32, f32, f32) {
    (
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
    )
}

/// Splits on explicit newlines, then greedily word-wraps each line into the
/// box width. A word wider than the box gets a line of its own.
fn wrap_text(text: &str, size: f32, width: Option<f32>) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.split('\n') {
        let Some(limit) = width else {
            lines.push(source_line.to_string());
            continue;
        };
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if current.is_empty() || fonts::text_width(&candidate, size) <= limit {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        lines.push(current);
    }
    lines
}
