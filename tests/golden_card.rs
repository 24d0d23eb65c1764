use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use idcard::compositor::{Compositor, TemplateSource};
use idcard::crop::CroppedPhoto;
use idcard::rendering::raster::{fingerprint, Fonts};
use idcard::{Field, FormFields};
use image::{Rgba, RgbaImage};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

/// Photo with four coloured quadrants so orientation errors show up
fn quadrant_photo(size: u32) -> CroppedPhoto {
    let half = size / 2;
    let img = RgbaImage::from_fn(size, size, |x, y| match (x < half, y < half) {
        (true, true) => Rgba([255, 0, 0, 255]),
        (false, true) => Rgba([0, 255, 0, 255]),
        (true, false) => Rgba([0, 0, 255, 255]),
        (false, false) => Rgba([255, 255, 0, 255]),
    });
    CroppedPhoto::from_image(img)
}

fn form() -> FormFields {
    FormFields::new()
        .with(Field::Name, "Golden Sample")
        .with(Field::DateOfBirth, "1990-12-25")
        .with(Field::IdentifierSeed, "000000000042")
        .with(Field::City, "Hubli")
        .with(Field::Region, "Karnataka")
        .with(Field::PostalCode, "580020")
        .with(Field::ContactNumber, "9000000000")
}

#[tokio::test]
async fn golden_card_matches_fixture() {
    let compositor = Compositor::new(TemplateSource::Builtin, Fonts::bundled().unwrap());
    let issued = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let card = compositor
        .compose(&form(), Some(&quadrant_photo(288)), issued)
        .await
        .expect("compose");

    let img = image::load_from_memory(card.png()).expect("decode").to_rgba8();
    assert_eq!(img.dimensions(), (400, 600));
    assert_eq!(fingerprint(&img), card.fingerprint());

    // Quadrants land around the circle center (200, 179)
    assert_eq!(img.get_pixel(170, 150).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(230, 150).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(170, 210).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(230, 210).0, [255, 255, 0, 255]);

    // Every text row leaves white ink in its band
    for (top, bottom) in [(375, 405), (410, 430), (460, 486), (495, 521), (540, 555)] {
        let lit = (top..bottom)
            .flat_map(|y| (0..400).map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0[0] > 200)
            .count();
        assert!(lit > 20, "no text between y={} and y={}", top, bottom);
    }

    let expected_path = golden_path("card_builtin.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, card.fingerprint()).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    if !expected_path.exists() {
        println!(
            "No golden at {:?}; run with UPDATE_GOLDENS=1 to create it. Skipping.",
            expected_path
        );
        return;
    }

    let exp = fs::read_to_string(&expected_path).expect("unable to read golden");
    let exp_bytes = hex::decode(exp.trim()).expect("invalid hex in golden");
    assert_eq!(hex::decode(card.fingerprint()).unwrap(), exp_bytes);
}
