use crate::certificate::{CopyrightClause, Kind};

use super::{
    Align, CertificateTemplate, ClauseSlot, Color, DrawOp, FieldColumnOp, FieldRow, ImageOp,
    ImageSource, LinkOp, PageTemplate, TextOp, TextSource,
};

const PAGE_WIDTH: f32 = 1080.0;
const PAGE_HEIGHT: f32 = 1528.0;

const INK: Color = Color::BLACK;
const TEXT_GRAY: Color = Color { r: 74, g: 74, b: 74 };
const VALUE_GRAY: Color = Color { r: 78, g: 78, b: 78 };
const LINK_BLUE: Color = Color { r: 0, g: 0, b: 255 };

// Timestamp box anchored at the top-right margin.
const STAMP_BOX_X: f32 = 850.0;
const STAMP_BOX_WIDTH: f32 = 180.0;

const fn stamp_line(source: TextSource, y: f32) -> DrawOp {
    DrawOp::Text(TextOp {
        source,
        x: STAMP_BOX_X,
        y,
        size: 16.0,
        color: INK,
        opacity: 1.0,
        width: Some(STAMP_BOX_WIDTH),
        align: Align::Right,
    })
}

const fn title(text: &'static str, size: f32) -> DrawOp {
    DrawOp::Text(TextOp {
        source: TextSource::Literal(text),
        x: 0.0,
        y: 60.0,
        size,
        color: INK,
        opacity: 1.0,
        width: None,
        align: Align::Center,
    })
}

// Value boxes run out to the right page edge, so x + width is always
// PAGE_WIDTH and wrapped lines stay on the canvas.
const fn value(field: &'static str, x: f32, y: f32, size: f32, width: f32) -> DrawOp {
    DrawOp::Text(TextOp {
        source: TextSource::Field(field),
        x,
        y,
        size,
        color: TEXT_GRAY,
        opacity: 1.0,
        width: Some(width),
        align: Align::Left,
    })
}

pub const CLAUSE_SLOTS: [ClauseSlot; 8] = [
    ClauseSlot {
        tag: CopyrightClause::Adaption,
        caption: "Adaptation to the format/size required for digital placement\non the platform/web resource/mobile application.",
        x: 70.0,
        y: 450.0,
        width: 250.0,
    },
    ClauseSlot {
        tag: CopyrightClause::Storage,
        caption: "Storage of digital information, a file in a cloud data storage.",
        x: 400.0,
        y: 450.0,
        width: 250.0,
    },
    ClauseSlot {
        tag: CopyrightClause::Placement,
        caption: "Placement and publication\nof NFT on the platform/web resource/mobile application.",
        x: 740.0,
        y: 450.0,
        width: 250.0,
    },
    ClauseSlot {
        tag: CopyrightClause::Publication,
        caption: "Publication of a digital object\non the Internet in the\npublic domain.",
        x: 70.0,
        y: 620.0,
        width: 250.0,
    },
    ClauseSlot {
        tag: CopyrightClause::Metadata,
        caption: "An entry in the metadata\nof the digital fingerprint\nof the file for authentication.",
        x: 400.0,
        y: 620.0,
        width: 250.0,
    },
    ClauseSlot {
        tag: CopyrightClause::Demonstration,
        caption: "Digital display (demonstration) of an object in online or virtual galleries, AR/VR.",
        x: 740.0,
        y: 620.0,
        width: 250.0,
    },
    ClauseSlot {
        tag: CopyrightClause::Advertising,
        caption: "Publications in printed and electronic catalogs, advertising for the subsequent sale\nof the digital artwork.",
        x: 70.0,
        y: 800.0,
        width: 250.0,
    },
    ClauseSlot {
        tag: CopyrightClause::PersonalUse,
        caption: "Use of NFT for personal purposes and further\nresale as NFT.",
        x: 400.0,
        y: 800.0,
        width: 250.0,
    },
];

const BASIC_PAGE_1: &[DrawOp] = &[
    stamp_line(TextSource::Timestamp, 52.0),
    stamp_line(TextSource::Literal("UTC CONFIRMED"), 73.0),
    title("CERTIFICATE", 40.0),
    DrawOp::Image(ImageOp {
        source: ImageSource::Preview,
        x: 290.0,
        y: 150.0,
        width: 500.0,
        height: 500.0,
    }),
    DrawOp::Image(ImageOp {
        source: ImageSource::QrCode,
        x: 40.0,
        y: 870.0,
        width: 200.0,
        height: 200.0,
    }),
    value("token_id", 553.0, 1455.0, 16.0, 527.0),
];

const LICENSE_PAGE_1: &[DrawOp] = &[
    stamp_line(TextSource::Timestamp, 52.0),
    stamp_line(TextSource::Literal("UTC CONFIRMED"), 73.0),
    title("License Certificate", 32.0),
    DrawOp::Image(ImageOp {
        source: ImageSource::Preview,
        x: 290.0,
        y: 150.0,
        width: 500.0,
        height: 500.0,
    }),
    DrawOp::Image(ImageOp {
        source: ImageSource::QrCode,
        x: 40.0,
        y: 870.0,
        width: 200.0,
        height: 200.0,
    }),
    value("assetName", 553.0, 957.0, 20.0, 527.0),
    value("grantedBy", 553.0, 1050.0, 20.0, 527.0),
    value("goal", 553.0, 1115.0, 20.0, 527.0),
    value("licenseType", 553.0, 1182.0, 20.0, 527.0),
    DrawOp::Link(LinkOp {
        display: "IPFS LINK",
        href_field: "link",
        x: 553.0,
        y: 1255.0,
        size: 20.0,
        color: LINK_BLUE,
    }),
    value("regions", 553.0, 1325.0, 20.0, 527.0),
    DrawOp::Image(ImageOp {
        source: ImageSource::Asset("eth_logo.png"),
        x: 551.0,
        y: 1382.0,
        width: 24.0,
        height: 24.0,
    }),
    value("contract", 575.0, 1388.0, 16.0, 505.0),
    value("tokenId", 553.0, 1455.0, 16.0, 527.0),
    value("licence_from", 48.0, 1420.0, 20.0, 1032.0),
    value("licence_to", 216.0, 1420.0, 20.0, 864.0),
];

const LICENSE_PAGE_2: &[DrawOp] = &[
    DrawOp::Clauses(&CLAUSE_SLOTS),
    DrawOp::Image(ImageOp {
        source: ImageSource::QrCode,
        x: 40.0,
        y: 1000.0,
        width: 100.0,
        height: 100.0,
    }),
    DrawOp::FieldColumn(FieldColumnOp {
        x: 550.0,
        y: 1000.0,
        stride: 50.0,
        width: 460.0,
        value_size: 16.0,
        value_color: VALUE_GRAY,
        rows: &[
            FieldRow {
                label: "Description",
                source: TextSource::Field("description"),
            },
            FieldRow {
                label: "Genre",
                source: TextSource::Field("genre"),
            },
            FieldRow {
                label: "Dimensions",
                source: TextSource::Field("dimensions"),
            },
            FieldRow {
                label: "Format",
                source: TextSource::Field("format"),
            },
        ],
    }),
    value("licence_from", 563.0, 1420.0, 20.0, 517.0),
    value("licence_to", 731.0, 1420.0, 20.0, 349.0),
];

const TOKEN_PAGE_1: &[DrawOp] = &[
    stamp_line(TextSource::Timestamp, 52.0),
    stamp_line(TextSource::Literal("UTC CONFIRMED"), 73.0),
    title("Token Certificate", 32.0),
    DrawOp::Image(ImageOp {
        source: ImageSource::Preview,
        x: 290.0,
        y: 150.0,
        width: 500.0,
        height: 500.0,
    }),
    DrawOp::Image(ImageOp {
        source: ImageSource::QrCode,
        x: 40.0,
        y: 870.0,
        width: 200.0,
        height: 200.0,
    }),
    DrawOp::FieldColumn(FieldColumnOp {
        x: 553.0,
        y: 957.0,
        stride: 80.0,
        width: 460.0,
        value_size: 20.0,
        value_color: TEXT_GRAY,
        rows: &[
            FieldRow {
                label: "Owner",
                source: TextSource::Field("owner"),
            },
            FieldRow {
                label: "Artists",
                source: TextSource::Field("artists"),
            },
            FieldRow {
                label: "Creative asset",
                source: TextSource::Field("creativeAsset"),
            },
            FieldRow {
                label: "Creation date",
                source: TextSource::Field("creationDate"),
            },
            FieldRow {
                label: "Edition",
                source: TextSource::JoinedFields("edition", " / ", "quantity"),
            },
            FieldRow {
                label: "Contract",
                source: TextSource::Field("contract"),
            },
            FieldRow {
                label: "Token ID",
                source: TextSource::Field("tokenId"),
            },
        ],
    }),
];

const TOKEN_PAGE_2: &[DrawOp] = &[
    DrawOp::Clauses(&CLAUSE_SLOTS),
    DrawOp::Image(ImageOp {
        source: ImageSource::QrCode,
        x: 40.0,
        y: 1000.0,
        width: 100.0,
        height: 100.0,
    }),
    DrawOp::FieldColumn(FieldColumnOp {
        x: 550.0,
        y: 1000.0,
        stride: 50.0,
        width: 460.0,
        value_size: 16.0,
        value_color: VALUE_GRAY,
        rows: &[
            FieldRow {
                label: "Type",
                source: TextSource::Field("type"),
            },
            FieldRow {
                label: "Format",
                source: TextSource::Field("format"),
            },
        ],
    }),
];

const BASIC: CertificateTemplate = CertificateTemplate {
    width: PAGE_WIDTH,
    height: PAGE_HEIGHT,
    pages: &[PageTemplate {
        background: Some("certificate.png"),
        ops: BASIC_PAGE_1,
    }],
};

const LICENSE: CertificateTemplate = CertificateTemplate {
    width: PAGE_WIDTH,
    height: PAGE_HEIGHT,
    pages: &[
        PageTemplate {
            background: Some("license_1.png"),
            ops: LICENSE_PAGE_1,
        },
        PageTemplate {
            background: Some("license_2.png"),
            ops: LICENSE_PAGE_2,
        },
    ],
};

const TOKEN: CertificateTemplate = CertificateTemplate {
    width: PAGE_WIDTH,
    height: PAGE_HEIGHT,
    pages: &[
        PageTemplate {
            background: Some("token_1.png"),
            ops: TOKEN_PAGE_1,
        },
        PageTemplate {
            background: Some("token_2.png"),
            ops: TOKEN_PAGE_2,
        },
    ],
};

pub fn template_for(kind: Kind) -> &'static CertificateTemplate {
    match kind {
        Kind::Basic => &BASIC,
        Kind::License => &LICENSE,
        Kind::Token => &TOKEN,
    }
}
