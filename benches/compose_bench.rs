use criterion::{criterion_group, criterion_main, Criterion};

use chrono::NaiveDate;
use idcard::compositor::{Compositor, TemplateSource};
use idcard::crop::{crop_to_photo, CropRegion, CroppedPhoto, DisplaySize};
use idcard::rendering::raster::Fonts;
use idcard::{Field, FormFields};
use image::{Rgba, RgbaImage};

fn form() -> FormFields {
    FormFields::new()
        .with(Field::Name, "Bench Person")
        .with(Field::DateOfBirth, "1991-04-15")
        .with(Field::IdentifierSeed, "111122223333")
        .with(Field::City, "Belagavi")
        .with(Field::Region, "Karnataka")
        .with(Field::PostalCode, "590001")
        .with(Field::ContactNumber, "9000011111")
}

fn bench_compose(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let compositor = Compositor::new(TemplateSource::Builtin, Fonts::bundled().expect("bundled fonts"));
    let photo = CroppedPhoto::from_image(RgbaImage::from_pixel(400, 400, Rgba([120, 90, 60, 255])));
    let form = form();
    let issued = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    c.bench_function("compose_card", |b| {
        b.iter(|| {
            let _ = rt.block_on(compositor.compose(&form, Some(&photo), issued)).unwrap();
        })
    });
}

fn bench_crop(c: &mut Criterion) {
    let img = RgbaImage::from_fn(1600, 1200, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]));
    let display = DisplaySize::fit(img.dimensions(), 460);
    let region = CropRegion::pixels(80.0, 20.0, 300.0, 300.0);

    c.bench_function("crop_natural_resolution", |b| {
        b.iter(|| {
            let _ = crop_to_photo(&img, display, region).unwrap();
        })
    });
}

criterion_group!(benches, bench_compose, bench_crop);
criterion_main!(benches);
