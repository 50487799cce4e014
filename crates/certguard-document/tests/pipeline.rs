// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end pipeline tests on synthetic certificates: a 400x300 white page
// with an optional issuer logo (top-left), QR code (top-middle), and pen
// signature (bottom-right).

use std::sync::Arc;

use certguard_core::{AppConfig, CertguardError, CheckThresholds, VerificationStatus};
use certguard_document::{LogoCheck, Pipeline};
use certguard_security::hash_bytes;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};

const PAGE_W: u32 = 400;
const PAGE_H: u32 = 300;
const QR_PAYLOAD: &str = "CERT-2026-0042";

/// Issuer logo: 20x20 checkerboard with 2-pixel cells.
fn logo() -> GrayImage {
    GrayImage::from_fn(20, 20, |x, y| {
        if ((x / 2) + (y / 2)) % 2 == 0 {
            Luma([60u8])
        } else {
            Luma([200u8])
        }
    })
}

#[derive(Clone, Copy)]
struct Features {
    logo: bool,
    qr: bool,
    signature: bool,
}

fn certificate(features: Features) -> RgbImage {
    let mut page = RgbImage::from_pixel(PAGE_W, PAGE_H, Rgb([255, 255, 255]));

    if features.logo {
        for (x, y, p) in logo().enumerate_pixels() {
            let v = p.0[0];
            page.put_pixel(20 + x, 20 + y, Rgb([v, v, v]));
        }
    }

    if features.qr {
        let code = qrcode::QrCode::new(QR_PAYLOAD.as_bytes()).expect("qr fixture");
        let modules = code.width() as u32;
        let scale = 4;
        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color != qrcode::Color::Dark {
                continue;
            }
            let (mx, my) = (i as u32 % modules, i as u32 / modules);
            for dy in 0..scale {
                for dx in 0..scale {
                    page.put_pixel(150 + mx * scale + dx, 20 + my * scale + dy, Rgb([0, 0, 0]));
                }
            }
        }
    }

    if features.signature {
        // Two pen strokes inside the bottom-right signature region.
        for (y0, x0, x1) in [(250, 260, 360), (262, 280, 340)] {
            for y in y0..y0 + 3 {
                for x in x0..x1 {
                    page.put_pixel(x, y, Rgb([20, 20, 60]));
                }
            }
        }
    }

    page
}

fn png(img: RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode fixture");
    buf
}

fn pipeline() -> Pipeline {
    let logo = LogoCheck::from_template(logo(), 0.8).expect("logo template");
    Pipeline::from_logo(logo, &CheckThresholds::default())
}

#[test]
fn all_checks_passing_is_verified() {
    let bytes = png(certificate(Features {
        logo: true,
        qr: true,
        signature: true,
    }));

    let verdict = pipeline().verify(&bytes, "diploma.png");
    assert_eq!(verdict.status, VerificationStatus::Verified);
    assert_eq!(
        verdict.reasons,
        [
            format!("QR found: {QR_PAYLOAD}").as_str(),
            "Signature present.",
            "Logo detected."
        ]
    );
    assert_eq!(verdict.hash.as_deref(), Some(hash_bytes(&bytes).as_str()));
}

#[test]
fn missing_qr_and_signature_with_logo_is_flagged() {
    let bytes = png(certificate(Features {
        logo: true,
        qr: false,
        signature: false,
    }));

    let verdict = pipeline().verify(&bytes, "photocopy.png");
    assert_eq!(verdict.status, VerificationStatus::Flagged);
    assert_eq!(
        verdict.reasons,
        ["No QR code found.", "Signature missing.", "Logo detected."]
    );
    assert!(verdict.hash.is_some());
}

#[test]
fn missing_logo_rejects_otherwise_valid_document() {
    let bytes = png(certificate(Features {
        logo: false,
        qr: true,
        signature: true,
    }));

    let verdict = pipeline().verify(&bytes, "forgery.png");
    assert_eq!(verdict.status, VerificationStatus::Rejected);
    assert_eq!(verdict.reasons.last().map(String::as_str), Some("Logo not found."));
    assert_eq!(verdict.reasons[1], "Signature present.");
    assert!(verdict.reasons[0].starts_with("QR found: "));
}

#[test]
fn nothing_found_is_rejected_with_all_reasons() {
    let bytes = png(certificate(Features {
        logo: false,
        qr: false,
        signature: false,
    }));

    let verdict = pipeline().verify(&bytes, "blank.png");
    assert_eq!(verdict.status, VerificationStatus::Rejected);
    assert_eq!(
        verdict.reasons,
        ["No QR code found.", "Signature missing.", "Logo not found."]
    );
}

#[test]
fn undecodable_upload_is_error_but_still_hashable() {
    let bytes = b"GIF89a\x00\x00 truncated garbage".to_vec();

    let verdict = pipeline().verify(&bytes, "broken.gif");
    assert_eq!(verdict.status, VerificationStatus::Error);
    assert_eq!(verdict.reasons.len(), 1);
    assert_eq!(verdict.hash, None);

    // Hashing on its own does not depend on decoding.
    let digest = hash_bytes(&bytes);
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn document_smaller_than_logo_is_error() {
    let bytes = png(RgbImage::from_pixel(16, 16, Rgb([255, 255, 255])));

    let verdict = pipeline().verify(&bytes, "thumbnail.png");
    assert_eq!(verdict.status, VerificationStatus::Error);
    assert_eq!(
        verdict.reasons,
        ["logo check could not run: template (20x20) is larger than the document (16x16)"]
    );
    assert_eq!(verdict.hash, None);
}

#[test]
fn alpha_channel_is_ignored() {
    let rgb = certificate(Features {
        logo: true,
        qr: true,
        signature: true,
    });
    // Same page with a half-transparent alpha channel.
    let rgba = image::RgbaImage::from_fn(PAGE_W, PAGE_H, |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        image::Rgba([r, g, b, 128])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();

    let verdict = pipeline().verify(&bytes, "transparent.png");
    assert_eq!(verdict.status, VerificationStatus::Verified);
}

#[test]
fn concurrent_requests_agree() {
    let pipeline = Arc::new(pipeline());
    let bytes = Arc::new(png(certificate(Features {
        logo: true,
        qr: false,
        signature: true,
    })));

    let verdicts: Vec<_> = (0..6)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            let bytes = Arc::clone(&bytes);
            std::thread::spawn(move || pipeline.verify(&bytes, &format!("upload_{i}.png")))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert!(verdicts.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(verdicts[0].status, VerificationStatus::Flagged);
}

#[test]
fn verdict_serializes_to_output_record() {
    let bytes = png(certificate(Features {
        logo: true,
        qr: false,
        signature: false,
    }));
    let verdict = pipeline().verify(&bytes, "record.png");

    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["status"], "Flagged");
    assert_eq!(json["reasons"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["hash"], hash_bytes(&bytes));
}

#[test]
fn missing_logo_asset_prevents_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        logo_template_path: dir.path().join("logo_template.png"),
        ..AppConfig::default()
    };

    match Pipeline::new(&config) {
        Err(err @ CertguardError::Configuration(_)) => assert!(err.is_fatal()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("pipeline built without a logo template"),
    }
}

#[test]
fn logo_asset_on_disk_is_loaded_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo_template.png");
    logo().save(&path).unwrap();

    let config = AppConfig {
        logo_template_path: path,
        ..AppConfig::default()
    };
    let pipeline = Pipeline::new(&config).unwrap();

    let bytes = png(certificate(Features {
        logo: true,
        qr: true,
        signature: true,
    }));
    assert_eq!(pipeline.verify(&bytes, "diploma.png").status, VerificationStatus::Verified);
}

#[test]
fn unreadable_logo_asset_prevents_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo_template.png");
    std::fs::write(&path, b"this is not a png").unwrap();

    let config = AppConfig {
        logo_template_path: path,
        ..AppConfig::default()
    };
    let err = Pipeline::new(&config).err().expect("startup must fail");
    assert!(err.to_string().contains("unreadable"));
}
