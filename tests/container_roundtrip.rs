use image::Rgba;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use stego_container::common::export::{ExportBundle, ExportKind};
use stego_container::processing::{
    embed_payload_bytes, extract_payload_bytes, load_carrier, to_png_bytes, CapacityReport,
};
use stego_container::{decode, encode, ContainerFormat, RasterImage, StegoError};

fn noisy_carrier(width: u32, height: u32, seed: u64) -> RasterImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut image = RasterImage::new(width, height);
    for pixel in image.pixels_mut() {
        pixel.0 = rng.gen();
    }
    image
}

fn formats() -> [ContainerFormat; 2] {
    [ContainerFormat::RgbLsb, ContainerFormat::alpha_magic()]
}

#[test]
fn ok_survives_png_file_round_trip() {
    let carrier = RasterImage::from_pixel(50, 50, Rgba([255, 255, 255, 255]));
    let carrier_png = to_png_bytes(&carrier).unwrap();

    let stego_png = embed_payload_bytes(&carrier_png, b"OK", &ContainerFormat::RgbLsb).unwrap();
    let stego = load_carrier(&stego_png).unwrap();

    let header: u32 = stego
        .pixels()
        .take(32)
        .fold(0, |acc, p| (acc << 1) | u32::from(p.0[0] & 1));
    assert_eq!(header, 16);
    assert_eq!(
        extract_payload_bytes(&stego_png, &ContainerFormat::RgbLsb).unwrap(),
        b"OK"
    );
}

#[test]
fn ten_pixel_carrier_cannot_hold_rgb_header() {
    let carrier = RasterImage::from_pixel(10, 1, Rgba([0, 0, 0, 255]));

    let err = encode(carrier, b"a", &ContainerFormat::RgbLsb).unwrap_err();
    assert!(matches!(
        err,
        StegoError::CapacityExceeded {
            available_pixels: 10,
            ..
        }
    ));
}

#[test]
fn unrelated_png_is_not_an_alpha_container() {
    let random_png = to_png_bytes(&noisy_carrier(64, 48, 7)).unwrap();

    let err = extract_payload_bytes(&random_png, &ContainerFormat::alpha_magic()).unwrap_err();
    assert!(matches!(err, StegoError::FormatMismatch(_)));
}

#[test]
fn rgb_container_is_not_an_alpha_container() {
    let carrier = RasterImage::from_pixel(40, 40, Rgba([90, 120, 150, 255]));
    let stego = encode(carrier, br#"{"a":1}"#, &ContainerFormat::RgbLsb).unwrap();

    // Alpha is untouched by rgb_lsb, so no magic can be present
    let err = decode(&stego, &ContainerFormat::alpha_magic()).unwrap_err();
    assert!(matches!(err, StegoError::FormatMismatch(_)));
}

#[test]
fn alpha_container_read_as_rgb_lsb_is_empty() {
    // Red LSBs stay zero under alpha_magic, which reads as a zero-bit header.
    // Formats are never sniffed, so an empty payload is the accepted result.
    let carrier = RasterImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
    let stego = encode(carrier, b"hello", &ContainerFormat::alpha_magic()).unwrap();

    assert_eq!(decode(&stego, &ContainerFormat::RgbLsb).unwrap(), Vec::<u8>::new());
    assert_eq!(decode(&stego, &ContainerFormat::alpha_magic()).unwrap(), b"hello");
}

#[test]
fn decoding_twice_gives_same_payload() {
    for format in formats() {
        let stego = encode(noisy_carrier(32, 32, 3), b"template v2", &format).unwrap();
        let png = to_png_bytes(&stego).unwrap();

        let first = extract_payload_bytes(&png, &format).unwrap();
        let second = extract_payload_bytes(&png, &format).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, b"template v2");
    }
}

#[test]
fn rgb_lsb_only_touches_header_and_payload_pixels() {
    let carrier = noisy_carrier(40, 40, 11);
    let payload = b"Copieur A;1250;4;80;72";
    let stego = encode(carrier.clone(), payload, &ContainerFormat::RgbLsb).unwrap();
    let used = ContainerFormat::RgbLsb.required_pixels(payload.len()).unwrap();

    for (i, (before, after)) in carrier.pixels().zip(stego.pixels()).enumerate() {
        if i >= used {
            assert_eq!(before, after, "pixel {i} changed");
        } else if i >= 32 {
            for channel in 0..3 {
                assert_eq!(before.0[channel] | 1, after.0[channel] | 1);
            }
        }
        assert_eq!(before.0[3], after.0[3]);
    }
}

#[test]
fn alpha_magic_never_touches_rgb() {
    let carrier = noisy_carrier(20, 20, 5);
    let payload: Vec<u8> = (0..=255).collect();
    let stego = encode(carrier.clone(), &payload, &ContainerFormat::alpha_magic()).unwrap();

    for (before, after) in carrier.pixels().zip(stego.pixels()) {
        assert_eq!(before.0[..3], after.0[..3]);
    }
    assert_eq!(decode(&stego, &ContainerFormat::alpha_magic()).unwrap(), payload);
}

#[test]
fn export_bundle_travels_through_image() {
    let bundle = ExportBundle::new(
        "copieurs",
        ExportKind::Csv,
        "Nom de l'offre;Cout Total (€)\nRicoh MP;1 490,00 €\n",
    );
    let carrier = RasterImage::from_pixel(300, 300, Rgba([255, 255, 255, 255]));

    let stego = encode(carrier, &bundle.to_payload().unwrap(), &ContainerFormat::alpha_magic()).unwrap();
    let restored =
        ExportBundle::from_payload(&decode(&stego, &ContainerFormat::alpha_magic()).unwrap()).unwrap();

    assert_eq!(restored, bundle);
}

#[test]
fn capacity_report_agrees_with_encoder() {
    for format in formats() {
        let carrier = noisy_carrier(17, 13, 1);
        let report = CapacityReport::for_image(&carrier, &format, None);

        let exact = vec![0x5Au8; report.capacity_bytes];
        assert!(encode(carrier.clone(), &exact, &format).is_ok());

        let over = vec![0x5Au8; report.capacity_bytes + 1];
        assert!(!CapacityReport::for_image(&carrier, &format, Some(over.len())).fits());
        assert!(matches!(
            encode(carrier, &over, &format),
            Err(StegoError::CapacityExceeded { .. })
        ));
    }
}

fn format_strategy() -> impl Strategy<Value = ContainerFormat> {
    prop_oneof![
        Just(ContainerFormat::RgbLsb),
        any::<[u8; 8]>().prop_map(|magic| ContainerFormat::AlphaMagic { magic }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_trip_within_capacity(
        format in format_strategy(),
        width in 1u32..48,
        height in 1u32..48,
        seed in any::<u64>(),
        payload in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let carrier = noisy_carrier(width, height, seed);
        let pixels = (width * height) as usize;

        match format.capacity(pixels) {
            Some(capacity) if payload.len() <= capacity => {
                let stego = encode(carrier, &payload, &format).unwrap();
                prop_assert_eq!(decode(&stego, &format).unwrap(), payload);
            }
            _ => {
                let is_capacity_error = matches!(
                    encode(carrier, &payload, &format),
                    Err(StegoError::CapacityExceeded { .. })
                );
                prop_assert!(is_capacity_error);
            }
        }
    }

    #[test]
    fn exact_capacity_is_the_boundary(
        format in format_strategy(),
        width in 6u32..40,
        height in 6u32..40,
        seed in any::<u64>(),
    ) {
        let carrier = noisy_carrier(width, height, seed);
        let capacity = format.capacity((width * height) as usize).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let payload: Vec<u8> = (0..capacity).map(|_| rng.gen()).collect();

        let stego = encode(carrier.clone(), &payload, &format).unwrap();
        prop_assert_eq!(decode(&stego, &format).unwrap(), payload);

        let too_big = vec![0u8; capacity + 1];
        let is_capacity_error = matches!(
            encode(carrier, &too_big, &format),
            Err(StegoError::CapacityExceeded { .. })
        );
        prop_assert!(is_capacity_error);
    }
}
