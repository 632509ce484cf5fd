//! Certificate rendering: template lookup, request validation, page
//! composition, atomic persistence.

pub mod composer;
pub mod fonts;
pub mod images;

use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use lopdf::Document;
use tempfile::NamedTempFile;

use crate::certificate::{CertificateRequest, GeneratedCertificate};
use crate::config::Config;
use crate::error::RenderError;
use crate::storage;
use crate::template::registry;

use composer::Composer;

/// Composes the full document for a request. Pure given its inputs: the
/// caller supplies the timestamp and the download URL, so two calls with
/// identical arguments produce identical bytes.
pub fn compose_document(
    request: &CertificateRequest,
    stamp: &str,
    download_url: &str,
    assets_dir: &Path,
) -> Result<Document, RenderError> {
    let template = registry::template_for(request.kind);

    for name in template.required_fields() {
        match request.field(name) {
            Some(value) if !value.trim().is_empty() => {}
            _ => return Err(RenderError::MissingField(name.to_string())),
        }
    }

    let preview_path = request
        .preview_image
        .as_deref()
        .ok_or(RenderError::MissingImage)?;
    let bytes = std::fs::read(preview_path).map_err(|error| {
        tracing::warn!("Preview {} unreadable: {}", preview_path.display(), error);
        RenderError::MissingImage
    })?;
    let preview = images::encode_raster(&image::load_from_memory(&bytes)?)?;
    let qr = images::qr_raster(download_url)?;

    let mut composer = Composer::new(template, request, stamp, preview, qr, assets_dir);
    for page in template.pages {
        composer.compose_page(page)?;
    }
    Ok(composer.finish())
}

/// Renders one certificate and persists it under a fresh unique name in the
/// certificates folder. The final name only appears once the bytes are
/// flushed and synced, so a reported file is always complete.
pub fn render(
    request: &CertificateRequest,
    config: &Config,
) -> Result<GeneratedCertificate, RenderError> {
    let file_name = storage::certificate_file_name(request.kind);
    let download_url = format!(
        "{}/download/{}",
        request.origin.trim_end_matches('/'),
        file_name
    );
    let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut document = compose_document(request, &stamp, &download_url, &config.assets_folder)?;

    let temp = NamedTempFile::new_in(&config.certificates_folder)?;
    let path = config.certificates_folder.join(&file_name);
    {
        let mut writer = BufWriter::new(temp.as_file());
        document.save_to(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(&path)
        .map_err(|error| RenderError::Write(error.error))?;

    tracing::info!(
        "Generated {} certificate at {}",
        request.kind.as_str(),
        path.display()
    );

    Ok(GeneratedCertificate {
        file_name,
        path,
        download_url,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::path::{Path, PathBuf};

    use image::{Rgb, RgbImage};
    use lopdf::content::Content;
    use lopdf::{Document, Object};
    use tempfile::TempDir;

    use crate::certificate::{collect_copyrights, Kind};
    use crate::pdf::fonts;

    use super::*;

    const STAMP: &str = "2024-05-01 12:00:00";
    const URL: &str = "http://localhost:3023/download/test.pdf";

    /// First wrapped line (or a unique leading piece of it) of each clause
    /// caption, used to detect a clause in extracted page text.
    const CLAUSE_PREFIXES: [(&str, &str); 8] = [
        ("adaption", "Adaptation to the"),
        ("storage", "Storage of digital"),
        ("placement", "Placement and publication"),
        ("publication", "Publication of a digital"),
        ("metadata", "An entry in the metadata"),
        ("demonstration", "Digital display"),
        ("advertising", "Publications in printed"),
        ("personal_use", "Use of NFT"),
    ];

    fn test_config(root: &Path) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            upload_folder: root.join("uploads"),
            certificates_folder: root.join("certificates"),
            assets_folder: root.join("assets"),
            public_base_url: None,
        }
    }

    fn write_preview(dir: &Path) -> PathBuf {
        let path = dir.join("preview.png");
        let mut canvas = RgbImage::new(640, 420);
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 256) as u8, (y % 256) as u8, 120]);
        }
        canvas.save(&path).unwrap();
        path
    }

    fn field_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    fn basic_request(preview: PathBuf) -> CertificateRequest {
        CertificateRequest {
            kind: Kind::Basic,
            preview_image: Some(preview),
            fields: field_map(&[("token_id", "42")]),
            copyrights: BTreeSet::new(),
            origin: "http://localhost:3023".to_string(),
        }
    }

    fn license_request(preview: PathBuf) -> CertificateRequest {
        CertificateRequest {
            kind: Kind::License,
            preview_image: Some(preview),
            fields: field_map(&[
                ("licence_from", "2024-01-01"),
                ("licence_to", "2025-01-01"),
                ("assetName", "Sunrise"),
                ("grantedBy", "Alice"),
                ("goal", "Exhibition"),
                ("licenseType", "Exclusive"),
                ("regions", "Worldwide"),
                ("contract", "0xCAFE"),
                ("tokenId", "7"),
                ("genre", "Landscape"),
                ("dimensions", "4000x3000"),
                ("format", "png"),
                ("description", "A quiet sunrise over still water."),
                ("link", "ipfs://bafy123"),
            ]),
            copyrights: collect_copyrights(["storage"]),
            origin: "http://localhost:3023".to_string(),
        }
    }

    fn token_request(preview: PathBuf) -> CertificateRequest {
        CertificateRequest {
            kind: Kind::Token,
            preview_image: Some(preview),
            fields: field_map(&[
                ("owner", "Alice"),
                ("artists", "Bob"),
                ("creativeAsset", "Painting #1"),
                ("creationDate", "2024-01-01"),
                ("edition", "1"),
                ("quantity", "10"),
                ("contract", "0xABC"),
                ("tokenId", "42"),
                ("type", "image"),
                ("format", "png"),
            ]),
            copyrights: collect_copyrights(["storage", "metadata"]),
            origin: "http://localhost:3023".to_string(),
        }
    }

    fn compose(request: &CertificateRequest, assets: &Path) -> Document {
        compose_document(request, STAMP, URL, assets).unwrap()
    }

    fn number(object: &Object) -> f32 {
        match object {
            Object::Integer(value) => *value as f32,
            Object::Real(value) => *value,
            other => panic!("not a number: {:?}", other),
        }
    }

    /// Concatenates every Tj literal on a page, one per line.
    fn page_text(doc: &Document, page_number: u32) -> String {
        let pages = doc.get_pages();
        let data = doc.get_page_content(pages[&page_number]).unwrap();
        let content = Content::decode(&data).unwrap();
        let mut text = String::new();
        for operation in &content.operations {
            if operation.operator == "Tj" {
                if let Some(Object::String(bytes, _)) = operation.operands.first() {
                    text.push_str(&String::from_utf8_lossy(bytes));
                    text.push('\n');
                }
            }
        }
        text
    }

    /// The x operand of the Td preceding the given literal.
    fn td_x_before_literal(doc: &Document, page_number: u32, needle: &str) -> f32 {
        let pages = doc.get_pages();
        let data = doc.get_page_content(pages[&page_number]).unwrap();
        let content = Content::decode(&data).unwrap();
        let mut last_td = None;
        for operation in &content.operations {
            match operation.operator.as_str() {
                "Td" => last_td = operation.operands.first().map(number),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operation.operands.first() {
                        if bytes.as_slice() == needle.as_bytes() {
                            return last_td.unwrap();
                        }
                    }
                }
                _ => {}
            }
        }
        panic!("literal {:?} was never drawn", needle);
    }

    fn first_link_annotation(doc: &Document, page_number: u32) -> (Vec<f32>, String) {
        let pages = doc.get_pages();
        let page = doc.get_dictionary(pages[&page_number]).unwrap();
        let annots = page.get(b"Annots").unwrap().as_array().unwrap();
        let annotation = match annots.first().unwrap() {
            Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
            Object::Dictionary(dict) => dict,
            other => panic!("unexpected annotation entry: {:?}", other),
        };
        let rect = annotation
            .get(b"Rect")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(number)
            .collect();
        let action = annotation.get(b"A").unwrap().as_dict().unwrap();
        let uri = match action.get(b"URI").unwrap() {
            Object::String(bytes, _) => String::from_utf8_lossy(bytes).to_string(),
            other => panic!("unexpected URI entry: {:?}", other),
        };
        (rect, uri)
    }

    #[test]
    fn every_kind_produces_its_page_count_and_canvas() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");

        for (request, pages) in [
            (basic_request(preview.clone()), 1),
            (license_request(preview.clone()), 2),
            (token_request(preview.clone()), 2),
        ] {
            let doc = compose(&request, &assets);
            assert_eq!(doc.get_pages().len(), pages);
            for (_, page_id) in doc.get_pages() {
                let page = doc.get_dictionary(page_id).unwrap();
                let media_box: Vec<f32> = page
                    .get(b"MediaBox")
                    .unwrap()
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(number)
                    .collect();
                assert_eq!(media_box, vec![0.0, 0.0, 1080.0, 1528.0]);
            }
        }
    }

    #[test]
    fn identical_input_renders_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");
        let request = token_request(preview);

        let mut first = Vec::new();
        compose(&request, &assets).save_to(&mut first).unwrap();
        let mut second = Vec::new();
        compose(&request, &assets).save_to(&mut second).unwrap();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn missing_preview_aborts_before_any_file_exists() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        storage::ensure_dirs(&config.upload_folder, &config.certificates_folder).unwrap();

        let mut request = basic_request(PathBuf::new());
        request.preview_image = None;
        let error = render(&request, &config).unwrap_err();
        assert!(matches!(error, RenderError::MissingImage));

        request.preview_image = Some(dir.path().join("nope.png"));
        let error = render(&request, &config).unwrap_err();
        assert!(matches!(error, RenderError::MissingImage));

        let leftovers: Vec<_> = std::fs::read_dir(&config.certificates_folder)
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn undecodable_preview_is_rejected() {
        let dir = TempDir::new().unwrap();
        let garbage = dir.path().join("preview.png");
        std::fs::write(&garbage, b"plainly not a png").unwrap();

        let error =
            compose_document(&basic_request(garbage), STAMP, URL, &dir.path().join("assets"))
                .unwrap_err();
        assert!(matches!(error, RenderError::InvalidImage(_)));
    }

    #[test]
    fn absent_or_blank_required_field_is_reported_by_name() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");

        let mut request = token_request(preview.clone());
        request.fields.remove("owner");
        match compose_document(&request, STAMP, URL, &assets).unwrap_err() {
            RenderError::MissingField(name) => assert_eq!(name, "owner"),
            other => panic!("unexpected error: {}", other),
        }

        let mut request = token_request(preview);
        request.fields.insert("owner".to_string(), "   ".to_string());
        match compose_document(&request, STAMP, URL, &assets).unwrap_err() {
            RenderError::MissingField(name) => assert_eq!(name, "owner"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn each_copyright_tag_renders_only_its_slot_caption() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");

        for (tag, expected) in CLAUSE_PREFIXES {
            let mut request = token_request(preview.clone());
            request.copyrights = collect_copyrights([tag]);
            let doc = compose(&request, &assets);
            let text = page_text(&doc, 2);

            assert!(text.contains(expected), "{} caption missing", tag);
            for (other, prefix) in CLAUSE_PREFIXES {
                if other != tag {
                    assert!(
                        !text.contains(prefix),
                        "{} rendered alongside {}",
                        other,
                        tag
                    );
                }
            }
        }
    }

    #[test]
    fn empty_copyrights_render_no_clauses() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");

        let mut request = token_request(preview);
        request.copyrights = BTreeSet::new();
        let doc = compose(&request, &assets);
        let text = page_text(&doc, 2);

        for (tag, prefix) in CLAUSE_PREFIXES {
            assert!(!text.contains(prefix), "{} rendered from empty set", tag);
        }
    }

    #[test]
    fn link_annotation_matches_the_rendered_text_box() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");
        let doc = compose(&license_request(preview), &assets);

        let (rect, uri) = first_link_annotation(&doc, 1);
        assert_eq!(uri, "ipfs://bafy123");

        let width = fonts::text_width("IPFS LINK", 20.0);
        let height = fonts::line_height(20.0);
        assert!((rect[0] - 553.0).abs() < 1e-3);
        assert!((rect[2] - (553.0 + width)).abs() < 1e-3);
        assert!((rect[3] - rect[1] - height).abs() < 1e-3);
        assert!((rect[3] - (1528.0 - 1255.0)).abs() < 1e-3);
    }

    #[test]
    fn titles_are_centered_on_the_canvas() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");

        for (request, title, size) in [
            (basic_request(preview.clone()), "CERTIFICATE", 40.0),
            (license_request(preview.clone()), "License Certificate", 32.0),
            (token_request(preview.clone()), "Token Certificate", 32.0),
        ] {
            let doc = compose(&request, &assets);
            let x = td_x_before_literal(&doc, 1, title);
            let expected = (1080.0 - fonts::text_width(title, size)) / 2.0;
            assert!((x - expected).abs() < 1e-2, "{} drawn at {}", title, x);
        }
    }

    #[test]
    fn stamp_lines_are_right_aligned_in_their_box() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");
        let doc = compose(&basic_request(preview), &assets);

        let text = page_text(&doc, 1);
        assert!(text.contains(STAMP));
        assert!(text.contains("UTC CONFIRMED"));

        let x = td_x_before_literal(&doc, 1, "UTC CONFIRMED");
        let expected = 850.0 + 180.0 - fonts::text_width("UTC CONFIRMED", 16.0);
        assert!((x - expected).abs() < 1e-2);
    }

    #[test]
    fn long_transfer_values_wrap_inside_the_canvas() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");

        let long_name = "The International Foundation for Contemporary Digital Art and Heritage";
        let mut request = license_request(preview);
        request
            .fields
            .insert("licence_to".to_string(), long_name.to_string());
        let doc = compose(&request, &assets);

        let pages = doc.get_pages();
        let data = doc.get_page_content(pages[&2]).unwrap();
        let content = Content::decode(&data).unwrap();

        let mut last_td = None;
        let mut fragments = Vec::new();
        for operation in &content.operations {
            match operation.operator.as_str() {
                "Td" => last_td = operation.operands.first().map(number),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operation.operands.first() {
                        let literal = String::from_utf8_lossy(bytes).to_string();
                        if long_name.contains(&literal) {
                            fragments.push((last_td.unwrap(), literal));
                        }
                    }
                }
                _ => {}
            }
        }

        assert!(fragments.len() >= 2, "value never wrapped: {:?}", fragments);
        let rebuilt = fragments
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rebuilt, long_name);
        for (x, line) in &fragments {
            assert!((x - 731.0).abs() < 1e-3);
            assert!(x + fonts::text_width(line, 20.0) <= 1080.0);
        }
    }

    #[test]
    fn accented_values_keep_their_winansi_bytes() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");

        let mut request = token_request(preview);
        request
            .fields
            .insert("owner".to_string(), "Jos\u{e9}".to_string());
        let doc = compose(&request, &assets);

        let pages = doc.get_pages();
        let data = doc.get_page_content(pages[&1]).unwrap();
        let content = Content::decode(&data).unwrap();
        let drawn = content.operations.iter().any(|operation| {
            operation.operator == "Tj"
                && matches!(
                    operation.operands.first(),
                    Some(Object::String(bytes, _)) if bytes.as_slice() == b"Jos\xE9".as_slice()
                )
        });
        assert!(drawn, "owner value was not drawn as WinAnsi bytes");

        let page = doc.get_dictionary(pages[&1]).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let font_entry = resources.get(b"Font").unwrap().as_dict().unwrap();
        let font = match font_entry.get(fonts::FONT_RESOURCE.as_bytes()).unwrap() {
            Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
            other => panic!("unexpected font entry: {:?}", other),
        };
        match font.get(b"Encoding").unwrap() {
            Object::Name(name) => assert_eq!(name.as_slice(), b"WinAnsiEncoding".as_slice()),
            other => panic!("unexpected encoding entry: {:?}", other),
        }
    }

    #[test]
    fn token_scenario_renders_documented_literals() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");
        let doc = compose(&token_request(preview), &assets);

        assert_eq!(doc.get_pages().len(), 2);
        let first = page_text(&doc, 1);
        for literal in ["Alice", "Bob", "Painting #1", "1 / 10", "0xABC", "42"] {
            assert!(first.contains(literal), "page 1 is missing {:?}", literal);
        }

        let second = page_text(&doc, 2);
        assert!(second.contains("Storage of digital"));
        assert!(second.contains("An entry in the metadata"));
        assert!(!second.contains("Use of NFT"));
    }

    #[test]
    fn unreadable_assets_are_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let preview = write_preview(dir.path());
        let assets = dir.path().join("assets");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(assets.join("certificate.png"), b"not an image").unwrap();

        let doc = compose(&basic_request(preview), &assets);
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn render_persists_under_unique_kind_suffixed_names() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        storage::ensure_dirs(&config.upload_folder, &config.certificates_folder).unwrap();
        let preview = write_preview(dir.path());

        let request = token_request(preview);
        let first = render(&request, &config).unwrap();
        let second = render(&request, &config).unwrap();

        assert_ne!(first.file_name, second.file_name);
        for generated in [&first, &second] {
            assert!(generated.file_name.ends_with("_token__certificate.pdf"));
            assert!(generated.path.exists());
            assert_eq!(
                generated.download_url,
                format!("http://localhost:3023/download/{}", generated.file_name)
            );
        }

        let reloaded = Document::load(&first.path).unwrap();
        assert_eq!(reloaded.get_pages().len(), 2);
    }
}
